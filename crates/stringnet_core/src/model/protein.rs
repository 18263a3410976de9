//! Protein catalog records.

use serde::{Deserialize, Serialize};

/// Database-native stable protein identifier, e.g. `9606.ENSP00000269305`.
///
/// Kept as a type alias to make semantic intent explicit in signatures.
pub type ProteinId = String;

/// Canonical protein entity, created once by the loader.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Protein {
    pub protein_id: ProteinId,
    /// Human-readable symbol; may be empty in poorly annotated releases.
    pub preferred_name: Option<String>,
    pub annotation: Option<String>,
}

impl Protein {
    /// Preferred name, or the protein ID when no name is recorded.
    pub fn display_name(&self) -> &str {
        match self.preferred_name.as_deref() {
            Some(name) if !name.is_empty() => name,
            _ => self.protein_id.as_str(),
        }
    }
}

/// One alias row joined with the preferred name of its target protein.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AliasHit {
    pub protein_id: ProteinId,
    /// Provenance tag such as `Ensembl_HGNC` or `UniProt_AC`.
    pub source: Option<String>,
    pub preferred_name: Option<String>,
}

/// Extracts the NCBI taxon prefix of a STRING protein ID.
///
/// `9606.ENSP00000354587` yields `Some("9606")`; IDs without a numeric
/// prefix yield `None`.
pub fn taxon_of(protein_id: &str) -> Option<&str> {
    let (prefix, rest) = protein_id.split_once('.')?;
    if prefix.is_empty() || rest.is_empty() || !prefix.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    Some(prefix)
}
