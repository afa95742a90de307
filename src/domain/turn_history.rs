use std::collections::VecDeque;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::Turn;

pub const MAX_TURNS_STORED: usize = 40;

/// Append-only turn log that keeps at most [`MAX_TURNS_STORED`] entries,
/// dropping the oldest first. Stored entries that are not turns are skipped
/// on load.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<Value>", into = "Vec<Turn>")]
pub struct TurnHistory {
    turns: VecDeque<Turn>,
}

impl TurnHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, turn: Turn) {
        self.turns.push_back(turn);
        while self.turns.len() > MAX_TURNS_STORED {
            self.turns.pop_front();
        }
    }

    /// The last `n` turns, oldest first.
    pub fn recent(&self, n: usize) -> impl Iterator<Item = &Turn> {
        self.turns.iter().skip(self.turns.len().saturating_sub(n))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Turn> {
        self.turns.iter()
    }

    pub fn last(&self) -> Option<&Turn> {
        self.turns.back()
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }
}

impl From<Vec<Turn>> for TurnHistory {
    fn from(turns: Vec<Turn>) -> Self {
        let mut history = Self::new();
        for turn in turns {
            history.push(turn);
        }
        history
    }
}

impl From<Vec<Value>> for TurnHistory {
    fn from(entries: Vec<Value>) -> Self {
        let mut history = Self::new();
        for (index, entry) in entries.into_iter().enumerate() {
            match serde_json::from_value::<Turn>(entry) {
                Ok(turn) => history.push(turn),
                Err(e) => tracing::warn!(index, error = %e, "Skipping unreadable stored turn"),
            }
        }
        history
    }
}

impl From<TurnHistory> for Vec<Turn> {
    fn from(history: TurnHistory) -> Self {
        history.turns.into()
    }
}
