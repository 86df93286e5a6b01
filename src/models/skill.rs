//! Voice-platform request and response envelopes.
//!
//! Only the fields the skill reads are modelled; everything else in the
//! platform payload is ignored during deserialization.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkillEnvelope {
    #[serde(default)]
    pub session: Option<SkillSession>,
    #[serde(default)]
    pub context: Option<SkillContext>,
    pub request: SkillRequestBody,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkillSession {
    #[serde(default)]
    pub session_id: Option<String>,
    #[serde(default)]
    pub user: Option<SkillUser>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkillUser {
    #[serde(default)]
    pub user_id: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkillContext {
    #[serde(default)]
    pub geolocation: Option<DeviceGeolocation>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceGeolocation {
    #[serde(default)]
    pub coordinate: Option<DeviceCoordinate>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceCoordinate {
    pub latitude_in_degrees: f64,
    pub longitude_in_degrees: f64,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkillRequestBody {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub intent: Option<IntentBody>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct IntentBody {
    pub name: String,
    #[serde(default)]
    pub slots: HashMap<String, SlotValue>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SlotValue {
    #[serde(default)]
    pub value: Option<String>,
}

impl SkillEnvelope {
    /// Identity used to key the caller's stored location. The user id is
    /// stable across sessions, so it wins over the session id.
    pub fn session_key(&self) -> Option<String> {
        let session = self.session.as_ref()?;

        session
            .user
            .as_ref()
            .and_then(|user| user.user_id.clone())
            .or_else(|| session.session_id.clone())
            .filter(|key| !key.trim().is_empty())
    }

    pub fn device_coordinate(&self) -> Option<&DeviceCoordinate> {
        self.context
            .as_ref()?
            .geolocation
            .as_ref()?
            .coordinate
            .as_ref()
    }
}

impl IntentBody {
    /// Trimmed slot value, `None` when the slot is missing or blank.
    pub fn slot(&self, name: &str) -> Option<&str> {
        self.slots
            .get(name)
            .and_then(|slot| slot.value.as_deref())
            .map(str::trim)
            .filter(|value| !value.is_empty())
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SkillResponse {
    pub version: &'static str,
    pub response: ResponseBody,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseBody {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_speech: Option<OutputSpeech>,
    pub should_end_session: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct OutputSpeech {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub text: String,
}

impl SkillResponse {
    pub fn speak(text: impl Into<String>, should_end_session: bool) -> Self {
        Self {
            version: "1.0",
            response: ResponseBody {
                output_speech: Some(OutputSpeech {
                    kind: "PlainText",
                    text: text.into(),
                }),
                should_end_session,
            },
        }
    }

    pub fn silent() -> Self {
        Self {
            version: "1.0",
            response: ResponseBody {
                output_speech: None,
                should_end_session: true,
            },
        }
    }

    pub fn text(&self) -> Option<&str> {
        self.response
            .output_speech
            .as_ref()
            .map(|speech| speech.text.as_str())
    }
}
