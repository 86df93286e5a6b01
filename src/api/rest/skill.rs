use std::sync::Arc;

use axum::extract::State;
use axum::routing::post;
use axum::Json;
use axum::Router;

use crate::engine::skill::handle_envelope;
use crate::models::skill::{SkillEnvelope, SkillResponse};
use crate::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/skill", post(skill_request))
}

async fn skill_request(
    State(state): State<Arc<AppState>>,
    Json(envelope): Json<SkillEnvelope>,
) -> Json<SkillResponse> {
    Json(handle_envelope(&state, &envelope).await)
}
