//! Network selector shared by storage, builder and CLI.

use super::query::ValidationError;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Which edge set a query runs against.
///
/// Both sets cover the same protein catalog but differ in evidence and
/// scoring methodology.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Network {
    /// Functional associations (`protein.links`).
    Functional,
    /// Physical interactions (`protein.physical.links`), optional.
    Physical,
}

impl Network {
    pub const ALL: [Network; 2] = [Network::Functional, Network::Physical];

    /// Stable string id used by CLI flags and exports.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Functional => "functional",
            Self::Physical => "physical",
        }
    }

    /// Backing SQLite table.
    pub const fn table_name(self) -> &'static str {
        match self {
            Self::Functional => "edges_func",
            Self::Physical => "edges_phys",
        }
    }
}

impl Display for Network {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Network {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "functional" | "func" | "links" => Ok(Self::Functional),
            "physical" | "phys" | "physical.links" => Ok(Self::Physical),
            other => Err(ValidationError::UnknownNetwork(other.to_string())),
        }
    }
}
