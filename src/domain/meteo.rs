use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::lenient;

/// Weather snapshot attached to a session, usually seeded from a METAR.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Meteo {
    #[serde(default, deserialize_with = "lenient::optional_u32", skip_serializing_if = "Option::is_none")]
    pub wind_direction: Option<u32>,
    #[serde(default, deserialize_with = "lenient::optional_u32", skip_serializing_if = "Option::is_none")]
    pub wind_speed: Option<u32>,
    #[serde(default, deserialize_with = "lenient::optional_string", skip_serializing_if = "Option::is_none")]
    pub wind: Option<String>,
    #[serde(default, deserialize_with = "lenient::optional_string", skip_serializing_if = "Option::is_none")]
    pub qnh: Option<String>,
    #[serde(default, deserialize_with = "lenient::optional_string", skip_serializing_if = "Option::is_none")]
    pub transponder: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Meteo {
    /// Direction and speed, falling back to a `ddd/ss` wind string.
    pub fn wind_components(&self) -> (Option<u32>, Option<u32>) {
        let (parsed_direction, parsed_speed) = self
            .wind
            .as_deref()
            .map(parse_wind_components)
            .unwrap_or((None, None));
        (
            self.wind_direction.or(parsed_direction),
            self.wind_speed.or(parsed_speed),
        )
    }
}

/// Splits `"070/08"` into `(Some(70), Some(8))`.
pub fn parse_wind_components(wind: &str) -> (Option<u32>, Option<u32>) {
    match wind.split_once('/') {
        Some((direction, speed)) => (direction.trim().parse().ok(), speed.trim().parse().ok()),
        None => (None, None),
    }
}
