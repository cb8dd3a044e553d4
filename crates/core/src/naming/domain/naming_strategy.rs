use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// How a stored name is derived from the declared upload name.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NamingStrategy {
    /// Keep the declared name, appending `_1`, `_2`, … before the extension
    /// while the name is taken.
    #[default]
    Sequential,
    /// Replace the base with a random v4 UUID, keeping the extension.
    Random,
}

impl NamingStrategy {
    pub const ALL: &[NamingStrategy] = &[NamingStrategy::Sequential, NamingStrategy::Random];
}

impl fmt::Display for NamingStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NamingStrategy::Sequential => write!(f, "sequential"),
            NamingStrategy::Random => write!(f, "random"),
        }
    }
}

impl FromStr for NamingStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "sequential" => Ok(NamingStrategy::Sequential),
            "random" => Ok(NamingStrategy::Random),
            other => Err(format!(
                "Naming strategy must be 'sequential' or 'random', got '{other}'"
            )),
        }
    }
}
