use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ConfigurationError;

/// Generation strategy declared on a generated column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    /// Numeric auto-increment assigned by the engine.
    Increment,
    /// UUID string, produced client-side or by the engine's UUID function.
    Uuid,
    /// Engine row identifier (e.g. SQLite `rowid`).
    Rowid,
    /// Values come only from the column's own generator.
    Custom,
}

impl Strategy {
    pub const ALL: [Strategy; 4] = [
        Strategy::Increment,
        Strategy::Uuid,
        Strategy::Rowid,
        Strategy::Custom,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Strategy::Increment => "increment",
            Strategy::Uuid => "uuid",
            Strategy::Rowid => "rowid",
            Strategy::Custom => "custom",
        }
    }

    /// Whether a caller-supplied generator may feed this strategy.
    ///
    /// Numeric engine-assigned keys do not accept client values on most engines.
    pub fn accepts_custom_generator(&self) -> bool {
        matches!(self, Strategy::Uuid | Strategy::Custom)
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, Strategy::Increment | Strategy::Rowid)
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Strategy {
    type Err = ConfigurationError;

    fn from_str(tag: &str) -> Result<Self, Self::Err> {
        let normalized = tag.trim().to_ascii_lowercase();
        Strategy::ALL
            .into_iter()
            .find(|strategy| strategy.as_str() == normalized)
            .ok_or_else(|| ConfigurationError::UnknownStrategy(tag.to_string()))
    }
}
