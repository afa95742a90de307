use serde::{Deserialize, Serialize};

const DEFAULT_RUNWAY_SPOKEN: &str = "uno cero";

/// Static reference data for the training airport.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AirportProfile {
    pub icao: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default = "default_runway")]
    pub default_runway: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alternate_runway: Option<String>,
}

impl AirportProfile {
    pub fn new(icao: impl Into<String>) -> Self {
        Self {
            icao: icao.into(),
            name: None,
            default_runway: default_runway(),
            alternate_runway: None,
        }
    }
}

fn default_runway() -> String {
    DEFAULT_RUNWAY_SPOKEN.to_string()
}
