//! Vehicle payloads in the Bus Tracker `getvehicles` shape.
//!
//! Both encodings share one raw model: a `bustime-response` root holding a
//! `vehicle` list or an `error` list. Numeric fields arrive as strings in
//! most feeds and are converted here, so a bad value surfaces as
//! `MalformedFeed` instead of a deserialization error.

use serde::Deserialize;

use crate::error::AppError;
use crate::models::location::Coordinate;
use crate::models::vehicle::VehicleReport;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedFormat {
    Json,
    Xml,
}

impl std::str::FromStr for FeedFormat {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "json" => Ok(FeedFormat::Json),
            "xml" => Ok(FeedFormat::Xml),
            other => Err(AppError::Internal(format!(
                "unknown feed format: {other}, expected json/xml"
            ))),
        }
    }
}

#[derive(Debug, Deserialize)]
struct JsonEnvelope {
    #[serde(rename = "bustime-response")]
    body: RawBody<JsonValue>,
}

#[derive(Debug, Deserialize)]
struct RawBody<V> {
    #[serde(rename = "vehicle", default = "Vec::new")]
    vehicles: Vec<RawVehicle<V>>,
    #[serde(rename = "error", default)]
    errors: Vec<RawError>,
}

#[derive(Debug, Deserialize)]
struct RawVehicle<V> {
    vid: V,
    lat: V,
    lon: V,
    hdg: Option<V>,
    rt: Option<V>,
}

#[derive(Debug, Deserialize)]
struct RawError {
    #[serde(default)]
    msg: Option<String>,
}

/// JSON feeds mix quoted and bare numbers. XML fields are always text and
/// use `String` directly.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum JsonValue {
    Number(f64),
    Text(String),
}

trait RawField {
    fn text(&self) -> String;
    fn number(&self, field: &str, vid: &str) -> Result<f64, AppError>;
}

impl RawField for String {
    fn text(&self) -> String {
        self.trim().to_string()
    }

    fn number(&self, field: &str, vid: &str) -> Result<f64, AppError> {
        let value = self.trim().parse::<f64>().map_err(|err| {
            AppError::MalformedFeed(format!("vehicle {vid}: {field} {self:?}: {err}"))
        })?;

        if !value.is_finite() {
            return Err(AppError::MalformedFeed(format!(
                "vehicle {vid}: {field} is not finite"
            )));
        }
        Ok(value)
    }
}

impl RawField for JsonValue {
    fn text(&self) -> String {
        match self {
            JsonValue::Number(n) => n.to_string(),
            JsonValue::Text(s) => s.text(),
        }
    }

    fn number(&self, field: &str, vid: &str) -> Result<f64, AppError> {
        match self {
            JsonValue::Number(n) => Ok(*n),
            JsonValue::Text(s) => s.number(field, vid),
        }
    }
}

pub fn parse_vehicles(body: &str, format: FeedFormat) -> Result<Vec<VehicleReport>, AppError> {
    match format {
        FeedFormat::Json => {
            let envelope = serde_json::from_str::<JsonEnvelope>(body)
                .map_err(|err| AppError::MalformedFeed(format!("invalid json payload: {err}")))?;
            into_reports(envelope.body)
        }
        FeedFormat::Xml => {
            let raw = quick_xml::de::from_str::<RawBody<String>>(body)
                .map_err(|err| AppError::MalformedFeed(format!("invalid xml payload: {err}")))?;
            into_reports(raw)
        }
    }
}

fn into_reports<V: RawField>(raw: RawBody<V>) -> Result<Vec<VehicleReport>, AppError> {
    if raw.vehicles.is_empty() {
        if let Some(message) = raw.errors.iter().filter_map(|e| e.msg.as_deref()).next() {
            // the provider reports an idle route as an error
            if message.to_lowercase().contains("no data found") {
                return Ok(Vec::new());
            }
            return Err(AppError::UpstreamUnavailable(format!(
                "provider error: {message}"
            )));
        }
    }

    raw.vehicles.iter().map(into_report).collect()
}

fn into_report<V: RawField>(raw: &RawVehicle<V>) -> Result<VehicleReport, AppError> {
    let id = raw.vid.text();
    if id.is_empty() {
        return Err(AppError::MalformedFeed("vehicle without an id".to_string()));
    }

    let latitude = raw.lat.number("lat", &id)?;
    let longitude = raw.lon.number("lon", &id)?;
    let coordinate = Coordinate::new(latitude, longitude)
        .map_err(|err| AppError::MalformedFeed(format!("vehicle {id}: {err}")))?;

    let heading = match &raw.hdg {
        Some(value) if value.text().is_empty() => None,
        Some(value) => Some(value.number("hdg", &id)?.rem_euclid(360.0)),
        None => None,
    };

    Ok(VehicleReport {
        id,
        coordinate,
        heading,
        route: raw.rt.as_ref().map(|route| route.text()),
    })
}

#[cfg(test)]
mod tests {
    use super::{parse_vehicles, FeedFormat};
    use crate::error::AppError;

    const JSON_FEED: &str = r#"{
        "bustime-response": {
            "vehicle": [
                { "vid": "1362", "tmstmp": "20241018 14:02", "lat": "41.851637",
                  "lon": "-87.619049", "hdg": "358", "rt": "3" },
                { "vid": 8679, "lat": 41.81137, "lon": -87.616706, "hdg": 182 }
            ]
        }
    }"#;

    const XML_FEED: &str = r#"<?xml version="1.0"?>
        <bustime-response>
            <vehicle>
                <vid>1362</vid>
                <lat>41.851637</lat>
                <lon>-87.619049</lon>
                <hdg>358</hdg>
                <rt>3</rt>
            </vehicle>
            <vehicle>
                <vid>7921</vid>
                <lat>41.721882</lat>
                <lon>-87.618286</lon>
            </vehicle>
        </bustime-response>"#;

    #[test]
    fn parses_json_strings_and_numbers() {
        let reports = parse_vehicles(JSON_FEED, FeedFormat::Json).unwrap();

        assert_eq!(reports.len(), 2);
        assert_eq!(reports[0].id, "1362");
        assert_eq!(reports[0].coordinate.latitude, 41.851637);
        assert_eq!(reports[0].heading, Some(358.0));
        assert_eq!(reports[0].route.as_deref(), Some("3"));
        assert_eq!(reports[1].id, "8679");
        assert_eq!(reports[1].heading, Some(182.0));
        assert!(reports[1].route.is_none());
    }

    #[test]
    fn parses_xml_with_optional_heading() {
        let reports = parse_vehicles(XML_FEED, FeedFormat::Xml).unwrap();

        assert_eq!(reports.len(), 2);
        assert_eq!(reports[0].id, "1362");
        assert_eq!(reports[0].coordinate.longitude, -87.619049);
        assert_eq!(reports[0].heading, Some(358.0));
        assert_eq!(reports[1].id, "7921");
        assert!(reports[1].heading.is_none());
    }

    #[test]
    fn idle_route_is_an_empty_list() {
        let body = r#"{ "bustime-response": { "error": [ { "rt": "3", "msg": "No data found for parameter" } ] } }"#;
        assert!(parse_vehicles(body, FeedFormat::Json).unwrap().is_empty());
    }

    #[test]
    fn interleaved_errors_do_not_hide_vehicles() {
        let body = r#"<bustime-response>
            <vehicle><vid>1362</vid><lat>41.851637</lat><lon>-87.619049</lon></vehicle>
            <error><rt>X9</rt><msg>No data found for parameter</msg></error>
            <vehicle><vid>8679</vid><lat>41.81137</lat><lon>-87.616706</lon><hdg>182</hdg></vehicle>
        </bustime-response>"#;

        let reports = parse_vehicles(body, FeedFormat::Xml).unwrap();
        let ids: Vec<&str> = reports.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, ["1362", "8679"]);
    }

    #[test]
    fn other_provider_errors_are_upstream_failures() {
        let body = "<bustime-response><error><msg>Invalid API access key supplied</msg></error></bustime-response>";
        let err = parse_vehicles(body, FeedFormat::Xml).unwrap_err();
        assert!(matches!(err, AppError::UpstreamUnavailable(_)));
    }

    #[test]
    fn unparsable_numbers_are_malformed() {
        let body = r#"{ "bustime-response": { "vehicle": [ { "vid": "1", "lat": "north-ish", "lon": "-87.6" } ] } }"#;
        let err = parse_vehicles(body, FeedFormat::Json).unwrap_err();
        assert!(matches!(err, AppError::MalformedFeed(_)));
    }

    #[test]
    fn out_of_range_coordinates_are_malformed() {
        let body = r#"{ "bustime-response": { "vehicle": [ { "vid": "1", "lat": "141.8", "lon": "-87.6" } ] } }"#;
        let err = parse_vehicles(body, FeedFormat::Json).unwrap_err();
        assert!(matches!(err, AppError::MalformedFeed(_)));
    }

    #[test]
    fn garbage_is_malformed() {
        assert!(matches!(
            parse_vehicles("not json", FeedFormat::Json),
            Err(AppError::MalformedFeed(_))
        ));
        assert!(matches!(
            parse_vehicles("<bustime-response><vehicle>", FeedFormat::Xml),
            Err(AppError::MalformedFeed(_))
        ));
    }

    #[test]
    fn format_names_parse() {
        assert_eq!("JSON".parse::<FeedFormat>().unwrap(), FeedFormat::Json);
        assert_eq!("xml".parse::<FeedFormat>().unwrap(), FeedFormat::Xml);
        assert!("csv".parse::<FeedFormat>().is_err());
    }
}
