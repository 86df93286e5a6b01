use prometheus::{
    Encoder, HistogramOpts, HistogramVec, IntCounterVec, IntGauge, Opts, Registry, TextEncoder,
};

#[derive(Clone)]
pub struct Metrics {
    registry: Registry,
    pub skill_requests_total: IntCounterVec,
    pub match_outcomes_total: IntCounterVec,
    pub feed_fetch_latency_seconds: HistogramVec,
    pub known_locations: IntGauge,
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

impl Metrics {
    pub fn new() -> Self {
        let registry = Registry::new();

        let skill_requests_total = IntCounterVec::new(
            Opts::new("skill_requests_total", "Skill requests by intent"),
            &["intent"],
        )
        .expect("valid skill_requests_total metric");

        let match_outcomes_total = IntCounterVec::new(
            Opts::new("match_outcomes_total", "Bus queries by outcome"),
            &["outcome"],
        )
        .expect("valid match_outcomes_total metric");

        let feed_fetch_latency_seconds = HistogramVec::new(
            HistogramOpts::new(
                "feed_fetch_latency_seconds",
                "Latency of vehicle feed fetches in seconds",
            ),
            &["outcome"],
        )
        .expect("valid feed_fetch_latency_seconds metric");

        let known_locations = IntGauge::new(
            "known_locations",
            "Number of callers with a stored location",
        )
        .expect("valid known_locations metric");

        registry
            .register(Box::new(skill_requests_total.clone()))
            .expect("register skill_requests_total");
        registry
            .register(Box::new(match_outcomes_total.clone()))
            .expect("register match_outcomes_total");
        registry
            .register(Box::new(feed_fetch_latency_seconds.clone()))
            .expect("register feed_fetch_latency_seconds");
        registry
            .register(Box::new(known_locations.clone()))
            .expect("register known_locations");

        Self {
            registry,
            skill_requests_total,
            match_outcomes_total,
            feed_fetch_latency_seconds,
            known_locations,
        }
    }

    pub fn encode(&self) -> Result<String, String> {
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();

        TextEncoder::new()
            .encode(&metric_families, &mut buffer)
            .map_err(|err| format!("failed to encode metrics: {err}"))?;

        String::from_utf8(buffer).map_err(|err| format!("metrics are not valid utf8: {err}"))
    }
}
