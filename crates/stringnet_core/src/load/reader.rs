//! Whitespace/tab separated STRING flat files, optionally gzip-compressed.
//!
//! # Invariants
//! - A first line starting with `#`, or naming a known column, is a header;
//!   any other first line is data.
//! - Blank lines and `#` comment lines are never yielded as rows.

use super::{LoadError, LoadResult};
use flate2::bufread::MultiGzDecoder;
use log::trace;
use once_cell::sync::Lazy;
use regex::Regex;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid ws regex"));

const KNOWN_COLUMNS: &[&str] = &[
    "protein_id",
    "string_protein_id",
    "preferred_name",
    "annotation",
    "alias",
    "source",
    "protein1",
    "protein2",
    "combined_score",
    "score",
];

/// Opens `path` for line reading, decoding gzip when it ends in `.gz`.
pub fn open_read_maybe_gz(path: &Path) -> LoadResult<Box<dyn BufRead>> {
    let file = File::open(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    if path.extension().and_then(|ext| ext.to_str()) == Some("gz") {
        trace!("event=open_input module=load mode=gzip path={}", path.display());
        Ok(Box::new(BufReader::new(MultiGzDecoder::new(BufReader::new(
            file,
        )))))
    } else {
        trace!("event=open_input module=load mode=plain path={}", path.display());
        Ok(Box::new(BufReader::new(file)))
    }
}

/// Splits one data line: on tabs when present, else on runs of whitespace.
pub fn split_fields(line: &str) -> Vec<&str> {
    let line = line.trim_end_matches(['\n', '\r']);
    if line.contains('\t') {
        line.split('\t').map(str::trim).collect()
    } else {
        WHITESPACE_RE.split(line.trim()).collect()
    }
}

/// Header column names, matched by name with positional fallbacks.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnMap {
    names: Vec<String>,
}

impl ColumnMap {
    /// Parses a header line such as `#string_protein_id alias source` or
    /// `## string_protein_id ## alias ## source ##`.
    pub fn from_header(line: &str) -> Self {
        let names = WHITESPACE_RE
            .split(line.trim())
            .map(|token| token.trim_start_matches('#').to_ascii_lowercase())
            .filter(|token| !token.is_empty())
            .collect();
        Self { names }
    }

    /// Index of the first of `candidates` present in the header, else
    /// `fallback`.
    pub fn index_of(&self, candidates: &[&str], fallback: usize) -> usize {
        candidates
            .iter()
            .find_map(|candidate| self.names.iter().position(|name| name == candidate))
            .unwrap_or(fallback)
    }

    fn is_header_line(line: &str) -> bool {
        if line.starts_with('#') {
            return true;
        }
        let first = WHITESPACE_RE
            .split(line.trim())
            .next()
            .unwrap_or("")
            .to_ascii_lowercase();
        KNOWN_COLUMNS.contains(&first.as_str())
    }
}

/// Row reader over one input file.
pub struct TableReader {
    path: PathBuf,
    lines: Box<dyn BufRead>,
    columns: ColumnMap,
    pending_first: Option<String>,
    line_buf: String,
}

impl TableReader {
    /// Opens `path` and sniffs its header.
    pub fn open(path: &Path) -> LoadResult<Self> {
        let mut lines = open_read_maybe_gz(path)?;
        let mut first = String::new();
        lines.read_line(&mut first).map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let (columns, pending_first) = if ColumnMap::is_header_line(&first) {
            (ColumnMap::from_header(&first), None)
        } else {
            (ColumnMap::default(), Some(first))
        };

        Ok(Self {
            path: path.to_path_buf(),
            lines,
            columns,
            pending_first,
            line_buf: String::new(),
        })
    }

    pub fn columns(&self) -> &ColumnMap {
        &self.columns
    }

    /// Reads the next data line into an owned string; `None` at EOF.
    pub fn next_line(&mut self) -> LoadResult<Option<String>> {
        if let Some(first) = self.pending_first.take() {
            if is_data_line(&first) {
                return Ok(Some(first));
            }
        }
        loop {
            self.line_buf.clear();
            let read = self
                .lines
                .read_line(&mut self.line_buf)
                .map_err(|source| LoadError::Io {
                    path: self.path.clone(),
                    source,
                })?;
            if read == 0 {
                return Ok(None);
            }
            if is_data_line(&self.line_buf) {
                return Ok(Some(self.line_buf.clone()));
            }
        }
    }
}

fn is_data_line(line: &str) -> bool {
    let trimmed = line.trim();
    !trimmed.is_empty() && !trimmed.starts_with('#')
}

#[cfg(test)]
mod tests {
    use super::{split_fields, ColumnMap};

    #[test]
    fn header_tokens_ignore_hash_markers() {
        let columns = ColumnMap::from_header("## string_protein_id ## alias ## source ##");
        assert_eq!(columns.index_of(&["alias"], 9), 1);
        assert_eq!(columns.index_of(&["source"], 9), 2);
        assert_eq!(columns.index_of(&["taxon"], 9), 9);
    }

    #[test]
    fn known_first_column_marks_header_without_hash() {
        assert!(ColumnMap::is_header_line("protein1 protein2 combined_score\n"));
        assert!(!ColumnMap::is_header_line("9606.A 9606.B 900\n"));
    }

    #[test]
    fn annotation_and_score_columns_also_mark_headers() {
        assert!(ColumnMap::is_header_line("annotation\tprotein_id\n"));
        assert!(ColumnMap::is_header_line("Score protein1 protein2\n"));
        assert!(!ColumnMap::is_header_line("scored 9606.A 900\n"));
    }

    #[test]
    fn tab_separated_lines_keep_spaces_inside_fields() {
        let fields = split_fields("9606.A\tTP53\tCellular tumor antigen p53\n");
        assert_eq!(fields, vec!["9606.A", "TP53", "Cellular tumor antigen p53"]);

        let fields = split_fields("9606.A  9606.B   900\n");
        assert_eq!(fields, vec!["9606.A", "9606.B", "900"]);
    }
}
