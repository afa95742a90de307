use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TurnRole {
    Student,
    Controller,
}

impl TurnRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            TurnRole::Student => "student",
            TurnRole::Controller => "controller",
        }
    }

    /// Label used when a turn is quoted back to the model.
    pub fn display_label(&self) -> &'static str {
        match self {
            TurnRole::Student => "Student",
            TurnRole::Controller => "Controller",
        }
    }
}

impl FromStr for TurnRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "student" => Ok(TurnRole::Student),
            "controller" => Ok(TurnRole::Controller),
            _ => Err(format!("Invalid turn role: {}", s)),
        }
    }
}

impl fmt::Display for TurnRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
