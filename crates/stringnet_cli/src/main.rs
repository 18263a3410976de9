//! Command-line shell over `stringnet_core`.
//!
//! # Responsibility
//! - Parse flags into core requests and print compact, deterministic reports.
//! - Own process-level concerns: logging target, exit status, file paths.

use anyhow::{bail, Context};
use clap::{Args, Parser, Subcommand};
use log::info;
use std::path::{Path, PathBuf};
use stringnet_core::export::export_to_dir;
use stringnet_core::service::network_service::{DEFAULT_MAX_NODES, DEFAULT_THRESHOLD};
use stringnet_core::{
    database_summary, default_log_level, init_logging, init_stderr_logging, load_database,
    open_db, open_db_read_only, parse_identifier_list, Connection, ExpansionMode, LoadOptions, Network,
    NetworkRequest, NetworkService, ResolveReport, ResolveStatus,
};

/// CLI parser based on clap.
#[derive(Debug, Parser)]
#[command(
    author,
    version,
    about = "Explore STRING protein networks from a local SQLite database"
)]
struct Cli {
    #[command(flatten)]
    common: CommonArgs,

    #[command(subcommand)]
    command: Commands,
}

/// Arguments shared by all sub commands.
#[derive(Debug, Args)]
struct CommonArgs {
    /// Path of the SQLite database.
    #[arg(long, global = true, env = "STRINGNET_DB", default_value = "data/string.sqlite")]
    db: PathBuf,

    /// Log level: trace|debug|info|warn|error.
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Write rotating log files here instead of stderr.
    #[arg(long, global = true)]
    log_dir: Option<PathBuf>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Build the database from STRING flat files.
    Load(LoadArgs),
    /// Map identifiers to canonical protein IDs.
    Resolve(ResolveArgs),
    /// Build a subgraph around resolved identifiers.
    Network(NetworkArgs),
    /// Print schema version and table sizes.
    Info,
}

#[derive(Debug, Args)]
struct LoadArgs {
    /// `protein.info` file (plain or .gz).
    #[arg(long)]
    info: PathBuf,
    /// `protein.aliases` file (plain or .gz).
    #[arg(long)]
    aliases: PathBuf,
    /// `protein.links` file (plain or .gz).
    #[arg(long)]
    links: PathBuf,
    /// Optional `protein.physical.links` file.
    #[arg(long)]
    physical: Option<PathBuf>,
    /// Delete an existing database file first.
    #[arg(long)]
    overwrite: bool,
}

/// Identifier sources shared by `resolve` and `network`.
#[derive(Debug, Args)]
struct IdentifierArgs {
    /// Identifiers (protein IDs, gene symbols, UniProt accessions, ...).
    ids: Vec<String>,
    /// Read identifiers from a file (newline, comma or space separated).
    #[arg(long)]
    input: Option<PathBuf>,
    /// Restrict alias matches to one NCBI taxon, e.g. 9606.
    #[arg(long)]
    taxon: Option<String>,
}

impl IdentifierArgs {
    fn collect(&self) -> anyhow::Result<Vec<String>> {
        let mut text = self.ids.join("\n");
        if let Some(path) = &self.input {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("cannot read identifiers from `{}`", path.display()))?;
            text.push('\n');
            text.push_str(&content);
        }
        let identifiers = parse_identifier_list(&text);
        if identifiers.is_empty() {
            bail!("no identifiers given; pass them as arguments or via --input");
        }
        Ok(identifiers)
    }
}

#[derive(Debug, Args)]
struct ResolveArgs {
    #[command(flatten)]
    identifiers: IdentifierArgs,
}

#[derive(Debug, Args)]
struct NetworkArgs {
    #[command(flatten)]
    identifiers: IdentifierArgs,
    /// functional | physical
    #[arg(long, default_value = "functional")]
    network: Network,
    /// Minimum confidence in [0, 1].
    #[arg(long, default_value_t = DEFAULT_THRESHOLD)]
    threshold: f64,
    /// induced | expand
    #[arg(long, default_value = "induced")]
    mode: ExpansionMode,
    /// Node budget.
    #[arg(long, default_value_t = DEFAULT_MAX_NODES, allow_negative_numbers = true)]
    max_nodes: i64,
    /// Write nodes.csv, edges.csv and resolution.csv here.
    #[arg(long)]
    out_dir: Option<PathBuf>,
    /// Also write graph.json (requires --out-dir).
    #[arg(long, requires = "out_dir")]
    json: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_cli_logging(&cli.common)?;

    match &cli.command {
        Commands::Load(args) => run_load(&cli.common, args),
        Commands::Resolve(args) => run_resolve(&cli.common, args),
        Commands::Network(args) => run_network(&cli.common, args),
        Commands::Info => run_info(&cli.common),
    }
}

fn selected_log_level(common: &CommonArgs) -> &str {
    match common.log_level.as_deref() {
        Some(level) => level,
        None => default_log_level(),
    }
}

fn init_cli_logging(common: &CommonArgs) -> anyhow::Result<()> {
    let level = selected_log_level(common);
    let result = match &common.log_dir {
        Some(dir) => {
            let dir = absolute_path(dir)?;
            init_logging(level, &dir.to_string_lossy())
        }
        None => init_stderr_logging(level),
    };
    result.map_err(anyhow::Error::msg)
}

fn absolute_path(path: &Path) -> anyhow::Result<PathBuf> {
    if path.is_absolute() {
        return Ok(path.to_path_buf());
    }
    let cwd = std::env::current_dir().context("cannot determine current directory")?;
    Ok(cwd.join(path))
}

fn run_load(common: &CommonArgs, args: &LoadArgs) -> anyhow::Result<()> {
    if args.overwrite && common.db.exists() {
        std::fs::remove_file(&common.db)
            .with_context(|| format!("cannot remove `{}`", common.db.display()))?;
        info!("event=db_overwrite module=cli status=ok path={}", common.db.display());
    }
    if let Some(parent) = common.db.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("cannot create `{}`", parent.display()))?;
    }

    let mut conn = open_db(&common.db)
        .with_context(|| format!("cannot open `{}`", common.db.display()))?;
    let options = LoadOptions {
        info: args.info.clone(),
        aliases: args.aliases.clone(),
        links: args.links.clone(),
        physical: args.physical.clone(),
    };
    let summary = load_database(&mut conn, &options)?;

    println!("database: {}", common.db.display());
    println!(
        "proteins: {} (skipped {})",
        summary.proteins.accepted, summary.proteins.skipped
    );
    println!(
        "aliases: {} (skipped {})",
        summary.aliases.accepted, summary.aliases.skipped
    );
    println!(
        "functional edges: {} (skipped {})",
        summary.functional.accepted, summary.functional.skipped
    );
    match summary.physical {
        Some(stats) => println!(
            "physical edges: {} (skipped {})",
            stats.accepted, stats.skipped
        ),
        None => println!("physical edges: not loaded"),
    }
    println!("elapsed: {} ms", summary.duration_ms);
    Ok(())
}

fn run_resolve(common: &CommonArgs, args: &ResolveArgs) -> anyhow::Result<()> {
    let identifiers = args.identifiers.collect()?;
    let conn = open_query_db(&common.db)?;
    let service = NetworkService::sqlite(&conn);

    let report = service.resolve(&identifiers, args.identifiers.taxon.as_deref())?;
    print_resolution(&report);
    Ok(())
}

fn run_network(common: &CommonArgs, args: &NetworkArgs) -> anyhow::Result<()> {
    let identifiers = args.identifiers.collect()?;
    let conn = open_query_db(&common.db)?;
    let service = NetworkService::sqlite(&conn);

    let request = NetworkRequest {
        taxon_id: args.identifiers.taxon.clone(),
        network: args.network,
        threshold: args.threshold,
        mode: args.mode,
        max_nodes: args.max_nodes,
        ..NetworkRequest::new(identifiers)
    };
    let report = service.explore(&request)?;

    print_resolution(&report.resolution);
    println!();
    println!(
        "network={} mode={} threshold={:.3} max_nodes={}",
        report.request.network,
        report.request.mode,
        report.request.threshold.as_fraction(),
        report.request.max_nodes
    );
    println!(
        "nodes={} (seeds={} neighbors={}) edges={}",
        report.view.nodes.len(),
        report.subgraph.seed_count,
        report.subgraph.neighbors().len(),
        report.view.edges.len()
    );
    if !report.subgraph.truncated_seeds.is_empty() {
        println!(
            "truncated seeds ({}): {}",
            report.subgraph.truncated_seeds.len(),
            report.subgraph.truncated_seeds.join(", ")
        );
    }
    let unresolved: Vec<&str> = report
        .resolution
        .unresolved()
        .map(|item| item.query.as_str())
        .collect();
    if !unresolved.is_empty() {
        println!("unresolved: {}", unresolved.join(", "));
    }
    if report.view.is_empty() {
        println!("no nodes; nothing resolved or everything was filtered");
    }

    if let Some(dir) = &args.out_dir {
        let files = export_to_dir(dir, &report.resolution, &report.view, args.json)
            .with_context(|| format!("cannot export to `{}`", dir.display()))?;
        println!("wrote {}", files.nodes.display());
        println!("wrote {}", files.edges.display());
        println!("wrote {}", files.resolution.display());
        if let Some(path) = files.graph_json {
            println!("wrote {}", path.display());
        }
    }
    Ok(())
}

fn run_info(common: &CommonArgs) -> anyhow::Result<()> {
    let conn = open_query_db(&common.db)?;
    let summary = database_summary(&conn)?;

    println!("database: {}", common.db.display());
    println!("schema_version: {}", summary.schema_version);
    println!("proteins: {}", summary.protein_count);
    println!("aliases: {}", summary.alias_count);
    for entry in &summary.networks {
        match entry.edge_count {
            Some(count) => println!("{} edges: {count}", entry.network),
            None => println!("{} edges: unavailable", entry.network),
        }
    }
    Ok(())
}

fn open_query_db(path: &Path) -> anyhow::Result<Connection> {
    open_db_read_only(path).with_context(|| {
        format!(
            "cannot open `{}`; build it first with `stringnet load`",
            path.display()
        )
    })
}

fn print_resolution(report: &ResolveReport) {
    println!("query\tstatus\tprotein_id\tpreferred_name\tsource\talternates");
    for item in &report.items {
        let chosen = item.chosen();
        let alternates = item
            .alternates()
            .iter()
            .map(|candidate| candidate.protein_id.as_str())
            .collect::<Vec<_>>()
            .join(",");
        println!(
            "{}\t{}\t{}\t{}\t{}\t{}",
            item.query,
            item.status().as_str(),
            chosen.map_or("-", |c| c.protein_id.as_str()),
            chosen.and_then(|c| c.preferred_name.as_deref()).unwrap_or("-"),
            chosen.and_then(|c| c.source.as_deref()).unwrap_or("-"),
            if alternates.is_empty() { "-" } else { alternates.as_str() }
        );
    }
    println!(
        "resolved={} ambiguous={} unresolved={}",
        report.count(ResolveStatus::Resolved),
        report.count(ResolveStatus::Ambiguous),
        report.count(ResolveStatus::Unresolved)
    );
}

#[cfg(test)]
mod tests {
    use super::{selected_log_level, Cli, Commands};
    use clap::{CommandFactory, Parser};
    use stringnet_core::default_log_level;

    #[test]
    fn command_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn explicit_log_level_wins_over_default() {
        let cli = Cli::try_parse_from(["stringnet", "--log-level", "warn", "info"]).unwrap();
        assert_eq!(selected_log_level(&cli.common), "warn");
        assert!(matches!(cli.command, Commands::Info));
    }

    #[test]
    fn missing_log_level_falls_back_to_build_default() {
        let cli = Cli::try_parse_from(["stringnet", "info"]).unwrap();
        assert_eq!(selected_log_level(&cli.common), default_log_level());
    }
}
