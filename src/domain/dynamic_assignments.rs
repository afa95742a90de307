use rand::Rng;
use rand::seq::IndexedRandom;
use serde::{Deserialize, Serialize};

use super::lenient;

pub const TAXI_ROUTES: [&str; 4] = ["Alfa 2, Alfa", "Alfa 3, Alfa", "Alfa, Bravo", "Alfa, Charlie"];
const WIND_DIRECTIONS: [u32; 6] = [50, 60, 70, 80, 90, 100];

/// Per-session randomized ATC values, generated once and then memoized so
/// every later turn sees the same squawk, wind and QNH.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DynamicAssignments {
    #[serde(default, deserialize_with = "lenient::optional_string", skip_serializing_if = "Option::is_none")]
    pub squawk: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub taxi_route: Option<String>,
    #[serde(
        rename = "windDirection",
        default,
        deserialize_with = "lenient::optional_u32",
        skip_serializing_if = "Option::is_none"
    )]
    pub wind_direction: Option<u32>,
    #[serde(
        rename = "windSpeed",
        default,
        deserialize_with = "lenient::optional_u32",
        skip_serializing_if = "Option::is_none"
    )]
    pub wind_speed: Option<u32>,
    #[serde(default, deserialize_with = "lenient::optional_string", skip_serializing_if = "Option::is_none")]
    pub qnh: Option<String>,
}

/// Local VFR departures get `05xx` codes.
pub fn generate_squawk<R: Rng + ?Sized>(rng: &mut R) -> String {
    format!("{:04}", rng.random_range(500..=599))
}

pub fn generate_taxi_route<R: Rng + ?Sized>(rng: &mut R) -> String {
    TAXI_ROUTES
        .choose(rng)
        .copied()
        .unwrap_or(TAXI_ROUTES[0])
        .to_string()
}

pub fn generate_wind_direction<R: Rng + ?Sized>(rng: &mut R) -> u32 {
    WIND_DIRECTIONS.choose(rng).copied().unwrap_or(WIND_DIRECTIONS[0])
}

pub fn generate_wind_speed<R: Rng + ?Sized>(rng: &mut R) -> u32 {
    rng.random_range(6..=16)
}

pub fn generate_qnh<R: Rng + ?Sized>(rng: &mut R) -> String {
    rng.random_range(3000..=3012).to_string()
}

/// Session value first, then the memoized one, then a fresh draw. The winner
/// is written back to both places.
pub(crate) fn remember<T, F>(session: &mut Option<T>, memo: &mut Option<T>, generate: F) -> T
where
    T: Clone,
    F: FnOnce() -> T,
{
    let value = session
        .clone()
        .or_else(|| memo.clone())
        .unwrap_or_else(generate);
    *memo = Some(value.clone());
    *session = Some(value.clone());
    value
}
