use std::str::FromStr;

use rust_decimal::{Decimal, RoundingStrategy};

const FREQUENCY_DECIMALS: u32 = 3;

/// Canonical decimal form of a tuned frequency, so `118.3`, `118.30` and
/// `118,300` all compare equal as `118.300`.
///
/// Values that do not parse as decimals are kept as their trimmed lowercase
/// text; blank input yields `None`.
pub fn normalize_frequency(value: &str) -> Option<String> {
    let cleaned = value.trim();
    if cleaned.is_empty() {
        return None;
    }

    let cleaned = cleaned.replace(',', ".");
    let parsed = Decimal::from_str(&cleaned).or_else(|_| Decimal::from_scientific(&cleaned));
    match parsed {
        Ok(decimal) => {
            let mut rounded = decimal
                .round_dp_with_strategy(FREQUENCY_DECIMALS, RoundingStrategy::MidpointAwayFromZero);
            rounded.rescale(FREQUENCY_DECIMALS);
            Some(rounded.to_string())
        }
        Err(_) => Some(cleaned.to_lowercase()),
    }
}

/// Outcome of comparing the tuned frequency against the one the active
/// phase expects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrequencyCheck {
    pub is_valid: bool,
    pub expected: Option<String>,
    pub received: Option<String>,
    expected_raw: Option<String>,
    received_raw: String,
}

impl FrequencyCheck {
    /// With no expected frequency configured every tuned value is accepted.
    pub fn evaluate(received: &str, expected: Option<&str>) -> Self {
        let expected_normalized = expected.and_then(normalize_frequency);
        let received_normalized = normalize_frequency(received);

        let is_valid = match &expected_normalized {
            None => true,
            Some(exp) => received_normalized.as_deref() == Some(exp.as_str()),
        };

        Self {
            is_valid,
            expected: expected_normalized,
            received: received_normalized,
            expected_raw: expected.map(|e| e.trim().to_string()).filter(|e| !e.is_empty()),
            received_raw: received.trim().to_string(),
        }
    }

    pub fn has_expected(&self) -> bool {
        self.expected_raw.is_some()
    }

    pub fn display_expected(&self, group_name: &str) -> String {
        self.expected
            .clone()
            .or_else(|| self.expected_raw.clone())
            .unwrap_or_else(|| group_name.to_string())
    }

    pub fn display_received(&self) -> String {
        self.received.clone().unwrap_or_else(|| {
            if self.received_raw.is_empty() {
                "<vacía>".to_string()
            } else {
                self.received_raw.clone()
            }
        })
    }

    /// Deterministic feedback given instead of a model reply.
    pub fn mismatch_feedback(&self, group_name: &str) -> String {
        format!(
            "La frecuencia esperada para esta solicitud es {}.",
            self.display_expected(group_name)
        )
    }
}
