//! Validated query parameters.
//!
//! # Invariants
//! - Validation happens at construction; downstream code never re-checks
//!   threshold or node-budget ranges.

use super::edge::SCORE_MAX;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Rejected query input, reported before any database access.
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// Fractional threshold outside `[0.0, 1.0]` (or NaN).
    ThresholdOutOfRange(f64),
    /// Integer score outside `[0, 1000]`.
    ScoreOutOfRange(i64),
    NonPositiveMaxNodes(i64),
    UnknownNetwork(String),
    UnknownMode(String),
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ThresholdOutOfRange(value) => {
                write!(f, "score threshold {value} is outside [0.0, 1.0]")
            }
            Self::ScoreOutOfRange(value) => {
                write!(f, "score {value} is outside [0, {SCORE_MAX}]")
            }
            Self::NonPositiveMaxNodes(value) => {
                write!(f, "max node count must be positive, got {value}")
            }
            Self::UnknownNetwork(value) => {
                write!(f, "unknown network `{value}`; expected functional|physical")
            }
            Self::UnknownMode(value) => {
                write!(f, "unknown mode `{value}`; expected induced|expand")
            }
        }
    }
}

impl Error for ValidationError {}

/// Minimum edge score, stored as the integer scale used on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ScoreThreshold(u16);

impl ScoreThreshold {
    /// Builds a threshold from the stored integer scale `[0, 1000]`.
    pub fn new(score_int: i64) -> Result<Self, ValidationError> {
        match u16::try_from(score_int) {
            Ok(value) if value <= SCORE_MAX => Ok(Self(value)),
            _ => Err(ValidationError::ScoreOutOfRange(score_int)),
        }
    }

    /// Builds a threshold from a probability in `[0.0, 1.0]`, scaled ×1000
    /// and rounded to the nearest integer.
    pub fn from_fraction(fraction: f64) -> Result<Self, ValidationError> {
        if !(0.0..=1.0).contains(&fraction) {
            return Err(ValidationError::ThresholdOutOfRange(fraction));
        }
        let scaled = (fraction * f64::from(SCORE_MAX)).round() as u16;
        Ok(Self(scaled.min(SCORE_MAX)))
    }

    pub fn as_int(self) -> u16 {
        self.0
    }

    pub fn as_fraction(self) -> f64 {
        f64::from(self.0) / f64::from(SCORE_MAX)
    }

    pub fn admits(self, score_int: u16) -> bool {
        score_int >= self.0
    }
}

/// Subgraph construction mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExpansionMode {
    /// Seeds and the edges among them only.
    Induced,
    /// Seeds plus their best-scoring direct neighbors.
    OneHop,
}

impl ExpansionMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Induced => "induced",
            Self::OneHop => "expand",
        }
    }
}

impl Display for ExpansionMode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExpansionMode {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "induced" => Ok(Self::Induced),
            "expand" | "one_hop" | "1hop" | "1-hop" => Ok(Self::OneHop),
            other => Err(ValidationError::UnknownMode(other.to_string())),
        }
    }
}

/// Validates a max-node budget.
pub fn validate_max_nodes(max_nodes: i64) -> Result<usize, ValidationError> {
    match usize::try_from(max_nodes) {
        Ok(value) if value > 0 => Ok(value),
        _ => Err(ValidationError::NonPositiveMaxNodes(max_nodes)),
    }
}

#[cfg(test)]
mod tests {
    use super::{validate_max_nodes, ExpansionMode, ScoreThreshold, ValidationError};

    #[test]
    fn fraction_is_scaled_and_rounded() {
        assert_eq!(ScoreThreshold::from_fraction(0.7).unwrap().as_int(), 700);
        assert_eq!(ScoreThreshold::from_fraction(0.4004).unwrap().as_int(), 400);
        assert_eq!(ScoreThreshold::from_fraction(1.0).unwrap().as_int(), 1000);
        assert_eq!(ScoreThreshold::from_fraction(0.0).unwrap().as_int(), 0);
    }

    #[test]
    fn out_of_range_thresholds_are_rejected() {
        assert_eq!(
            ScoreThreshold::from_fraction(1.5).unwrap_err(),
            ValidationError::ThresholdOutOfRange(1.5)
        );
        assert!(ScoreThreshold::from_fraction(-0.1).is_err());
        assert!(ScoreThreshold::from_fraction(f64::NAN).is_err());
        assert_eq!(
            ScoreThreshold::new(1001).unwrap_err(),
            ValidationError::ScoreOutOfRange(1001)
        );
    }

    #[test]
    fn admits_is_inclusive() {
        let threshold = ScoreThreshold::new(900).unwrap();
        assert!(threshold.admits(900));
        assert!(!threshold.admits(899));
    }

    #[test]
    fn max_nodes_must_be_positive() {
        assert_eq!(validate_max_nodes(10).unwrap(), 10);
        assert!(validate_max_nodes(0).is_err());
        assert!(validate_max_nodes(-3).is_err());
    }

    #[test]
    fn mode_parses_known_spellings() {
        assert_eq!("1-hop".parse::<ExpansionMode>().unwrap(), ExpansionMode::OneHop);
        assert_eq!("Induced".parse::<ExpansionMode>().unwrap(), ExpansionMode::Induced);
        assert!("two_hop".parse::<ExpansionMode>().is_err());
    }
}
