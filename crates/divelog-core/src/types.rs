use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Water a dive took place in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WaterType {
    Saltwater,
    Freshwater,
}

impl WaterType {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Saltwater => "saltwater",
            Self::Freshwater => "freshwater",
        }
    }
}

impl fmt::Display for WaterType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WaterType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "saltwater" => Ok(Self::Saltwater),
            "freshwater" => Ok(Self::Freshwater),
            other => Err(CoreError::InvalidInput(format!(
                "water type must be 'saltwater' or 'freshwater', got '{other}'"
            ))),
        }
    }
}

/// Kind of dive. Scuba unless stated otherwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiveMode {
    #[default]
    Scubadiving,
    Freediving,
}

impl DiveMode {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Scubadiving => "scubadiving",
            Self::Freediving => "freediving",
        }
    }
}

impl fmt::Display for DiveMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DiveMode {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "scubadiving" => Ok(Self::Scubadiving),
            "freediving" => Ok(Self::Freediving),
            other => Err(CoreError::InvalidInput(format!(
                "mode must be 'scubadiving' or 'freediving', got '{other}'"
            ))),
        }
    }
}
