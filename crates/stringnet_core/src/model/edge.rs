//! Undirected scored edges.

use super::protein::ProteinId;
use super::query::ValidationError;
use serde::{Deserialize, Serialize};

/// Upper bound of stored integer confidence scores.
pub const SCORE_MAX: u16 = 1000;

/// One undirected association with integer confidence `score_int`.
///
/// The score is probability × 1000 that the association is real; it is not
/// a binding strength.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Edge {
    pub p1: ProteinId,
    pub p2: ProteinId,
    pub score_int: u16,
}

impl Edge {
    /// Builds an edge in canonical orientation (`p1 < p2`).
    ///
    /// Returns `None` for self-loops, which have no canonical form.
    pub fn canonical(a: impl Into<String>, b: impl Into<String>, score_int: u16) -> Option<Self> {
        let (a, b) = (a.into(), b.into());
        let (p1, p2) = match a.cmp(&b) {
            std::cmp::Ordering::Less => (a, b),
            std::cmp::Ordering::Greater => (b, a),
            std::cmp::Ordering::Equal => return None,
        };
        Some(Self { p1, p2, score_int })
    }

    /// Normalized confidence in `[0.0, 1.0]`.
    pub fn score(&self) -> f64 {
        f64::from(self.score_int) / f64::from(SCORE_MAX)
    }

    pub fn is_canonical(&self) -> bool {
        self.p1 < self.p2
    }

    /// Returns the endpoint opposite to `id`, or `None` when `id` is not an
    /// endpoint.
    pub fn other_endpoint(&self, id: &str) -> Option<&str> {
        if self.p1 == id {
            Some(self.p2.as_str())
        } else if self.p2 == id {
            Some(self.p1.as_str())
        } else {
            None
        }
    }
}

/// Validates a raw stored/parsed score against `[0, 1000]`.
pub fn validate_score(raw: i64) -> Result<u16, ValidationError> {
    match u16::try_from(raw) {
        Ok(score) if score <= SCORE_MAX => Ok(score),
        _ => Err(ValidationError::ScoreOutOfRange(raw)),
    }
}
