use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use super::lenient;

/// How strictly the controller grades phraseology, from 1 (lenient) to 10.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(into = "u8")]
pub struct Difficulty(u8);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrictnessTier {
    Relaxed,
    Normal,
    Strict,
}

impl Difficulty {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 10;
    pub const DEFAULT: u8 = 5;

    /// Out-of-range levels are clamped rather than rejected.
    pub fn new(level: i64) -> Self {
        Self(level.clamp(Self::MIN as i64, Self::MAX as i64) as u8)
    }

    pub fn level(&self) -> u8 {
        self.0
    }

    pub fn tier(&self) -> StrictnessTier {
        match self.0 {
            0..=3 => StrictnessTier::Relaxed,
            4..=7 => StrictnessTier::Normal,
            _ => StrictnessTier::Strict,
        }
    }
}

impl Default for Difficulty {
    fn default() -> Self {
        Self(Self::DEFAULT)
    }
}

impl From<i64> for Difficulty {
    fn from(level: i64) -> Self {
        Self::new(level)
    }
}

impl From<Difficulty> for u8 {
    fn from(difficulty: Difficulty) -> Self {
        difficulty.0
    }
}

/// Accepts `7`, `7.0` and `"7"`.
impl<'de> Deserialize<'de> for Difficulty {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        lenient::value_as_i64(&value)
            .map(Self::new)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid difficulty: {value}")))
    }
}
