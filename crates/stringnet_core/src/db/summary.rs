//! Row-count summary of a loaded database.

use super::migrations::current_user_version;
use super::schema::table_exists;
use super::DbResult;
use crate::model::network::Network;
use rusqlite::Connection;
use serde::Serialize;

/// Per-network availability and size.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NetworkSummary {
    pub network: Network,
    /// `None` when the edge table is absent (network unavailable).
    pub edge_count: Option<u64>,
}

/// Snapshot of table sizes used by `info`-style diagnostics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DbSummary {
    pub schema_version: u32,
    pub protein_count: u64,
    pub alias_count: u64,
    pub networks: Vec<NetworkSummary>,
}

impl DbSummary {
    /// Returns the summary entry of `network`.
    pub fn network(&self, network: Network) -> Option<&NetworkSummary> {
        self.networks.iter().find(|entry| entry.network == network)
    }
}

/// Counts rows of every table known to the schema.
pub fn database_summary(conn: &Connection) -> DbResult<DbSummary> {
    let mut networks = Vec::with_capacity(Network::ALL.len());
    for network in Network::ALL {
        let table = network.table_name();
        let edge_count = if table_exists(conn, table)? {
            Some(count_rows(conn, table)?)
        } else {
            None
        };
        networks.push(NetworkSummary {
            network,
            edge_count,
        });
    }

    Ok(DbSummary {
        schema_version: current_user_version(conn)?,
        protein_count: count_rows(conn, "proteins")?,
        alias_count: count_rows(conn, "aliases")?,
        networks,
    })
}

fn count_rows(conn: &Connection, table: &str) -> DbResult<u64> {
    let count: i64 = conn.query_row(&format!("SELECT COUNT(*) FROM {table};"), [], |row| {
        row.get(0)
    })?;
    Ok(u64::try_from(count).unwrap_or(0))
}
