//! Flat-file export of resolution reports and network tables.
//!
//! # Responsibility
//! - Write `nodes.csv`, `edges.csv` and `resolution.csv` with stable headers.
//! - Write the renderer JSON document next to them on request.
//!
//! # Invariants
//! - Column order is part of the file contract:
//!   - nodes: `protein_id,preferred_name,degree`
//!   - edges: `p1,p2,score_int,score`
//!   - resolution: `query,status,protein_id,preferred_name,source,candidates`

use crate::graph::view::{EdgeRow, NetworkView, NodeRow};
use crate::graph::viz::VisGraph;
use crate::resolve::{ResolveReport, ResolvedToken};
use log::info;
use serde::Serialize;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

pub const NODES_FILE_NAME: &str = "nodes.csv";
pub const EDGES_FILE_NAME: &str = "edges.csv";
pub const RESOLUTION_FILE_NAME: &str = "resolution.csv";
pub const GRAPH_JSON_FILE_NAME: &str = "graph.json";

pub const NODE_COLUMNS: [&str; 3] = ["protein_id", "preferred_name", "degree"];
pub const EDGE_COLUMNS: [&str; 4] = ["p1", "p2", "score_int", "score"];
pub const RESOLUTION_COLUMNS: [&str; 6] = [
    "query",
    "status",
    "protein_id",
    "preferred_name",
    "source",
    "candidates",
];

pub type ExportResult<T> = Result<T, ExportError>;

#[derive(Debug)]
pub enum ExportError {
    Io { path: PathBuf, source: std::io::Error },
    Csv(csv::Error),
    Json(serde_json::Error),
}

impl Display for ExportError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => write!(f, "cannot write `{}`: {source}", path.display()),
            Self::Csv(err) => write!(f, "{err}"),
            Self::Json(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ExportError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Csv(err) => Some(err),
            Self::Json(err) => Some(err),
        }
    }
}

impl From<csv::Error> for ExportError {
    fn from(value: csv::Error) -> Self {
        Self::Csv(value)
    }
}

impl From<serde_json::Error> for ExportError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

/// Flat row of the resolution table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolutionRow {
    pub query: String,
    pub status: &'static str,
    pub protein_id: Option<String>,
    pub preferred_name: Option<String>,
    pub source: Option<String>,
    /// `id(source); id(source)` for ambiguous tokens, chosen first.
    pub candidates: Option<String>,
}

impl From<&ResolvedToken> for ResolutionRow {
    fn from(item: &ResolvedToken) -> Self {
        let chosen = item.chosen();
        let candidates = if item.alternates().is_empty() {
            None
        } else {
            let listed = chosen
                .into_iter()
                .chain(item.alternates())
                .map(|candidate| {
                    format!(
                        "{}({})",
                        candidate.protein_id,
                        candidate.source.as_deref().unwrap_or("")
                    )
                })
                .collect::<Vec<_>>();
            Some(listed.join("; "))
        };

        Self {
            query: item.query.clone(),
            status: item.status().as_str(),
            protein_id: chosen.map(|candidate| candidate.protein_id.clone()),
            preferred_name: chosen.and_then(|candidate| candidate.preferred_name.clone()),
            source: chosen.and_then(|candidate| candidate.source.clone()),
            candidates,
        }
    }
}

/// Files produced by [`export_to_dir`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportedFiles {
    pub nodes: PathBuf,
    pub edges: PathBuf,
    pub resolution: PathBuf,
    pub graph_json: Option<PathBuf>,
}

pub fn write_nodes_csv<W: Write>(writer: W, nodes: &[NodeRow]) -> ExportResult<()> {
    write_rows(writer, &NODE_COLUMNS, nodes)
}

pub fn write_edges_csv<W: Write>(writer: W, edges: &[EdgeRow]) -> ExportResult<()> {
    write_rows(writer, &EDGE_COLUMNS, edges)
}

pub fn write_resolution_csv<W: Write>(writer: W, report: &ResolveReport) -> ExportResult<()> {
    let rows: Vec<ResolutionRow> = report.items.iter().map(ResolutionRow::from).collect();
    write_rows(writer, &RESOLUTION_COLUMNS, &rows)
}

/// Writes all tables (and optionally the renderer JSON) into `dir`,
/// creating it when missing.
pub fn export_to_dir(
    dir: &Path,
    report: &ResolveReport,
    view: &NetworkView,
    with_graph_json: bool,
) -> ExportResult<ExportedFiles> {
    std::fs::create_dir_all(dir).map_err(|source| ExportError::Io {
        path: dir.to_path_buf(),
        source,
    })?;

    let files = ExportedFiles {
        nodes: dir.join(NODES_FILE_NAME),
        edges: dir.join(EDGES_FILE_NAME),
        resolution: dir.join(RESOLUTION_FILE_NAME),
        graph_json: with_graph_json.then(|| dir.join(GRAPH_JSON_FILE_NAME)),
    };

    write_nodes_csv(create_file(&files.nodes)?, &view.nodes)?;
    write_edges_csv(create_file(&files.edges)?, &view.edges)?;
    write_resolution_csv(create_file(&files.resolution)?, report)?;
    if let Some(path) = &files.graph_json {
        let graph = VisGraph::from_view(view);
        let mut writer = create_file(path)?;
        serde_json::to_writer_pretty(&mut writer, &graph)?;
        writer.flush().map_err(|source| ExportError::Io {
            path: path.clone(),
            source,
        })?;
    }

    info!(
        "event=export module=export status=ok nodes={} edges={} tokens={} graph_json={}",
        view.nodes.len(),
        view.edges.len(),
        report.items.len(),
        files.graph_json.is_some()
    );
    Ok(files)
}

/// Header is written up front so empty tables still carry their columns.
fn write_rows<W: Write, T: Serialize>(writer: W, columns: &[&str], rows: &[T]) -> ExportResult<()> {
    let mut csv_writer = csv::WriterBuilder::new().has_headers(false).from_writer(writer);
    csv_writer.write_record(columns)?;
    for row in rows {
        csv_writer.serialize(row)?;
    }
    csv_writer.flush().map_err(csv::Error::from)?;
    Ok(())
}

fn create_file(path: &Path) -> ExportResult<BufWriter<File>> {
    File::create(path)
        .map(BufWriter::new)
        .map_err(|source| ExportError::Io {
            path: path.to_path_buf(),
            source,
        })
}
