mod support;

use proptest::prelude::*;
use rusqlite::Connection;
use stringnet_core::db::{database_summary, open_db, open_db_in_memory, open_db_read_only};
use stringnet_core::graph::subgraph::{SubgraphBuilder, SubgraphError, SubgraphRequest};
use stringnet_core::load::{load_database, load_edges, LoadError, LoadOptions};
use stringnet_core::model::network::Network;
use stringnet_core::model::query::ExpansionMode;
use stringnet_core::repo::edge_repo::SqliteEdgeRepository;
use support::{fixture_options, write_gz, write_plain, ATM, MDM2, MOUSE_TRP53, TP53};

#[test]
fn load_reports_accepted_and_skipped_rows_per_table() {
    let dir = tempfile::tempdir().unwrap();
    let mut conn = open_db_in_memory().unwrap();

    let summary = load_database(&mut conn, &fixture_options(dir.path(), false)).unwrap();

    assert_eq!(summary.proteins.accepted, 8);
    assert_eq!(summary.proteins.skipped, 0);
    assert_eq!(summary.aliases.accepted, 15);
    assert_eq!(summary.functional.accepted, 11);
    assert_eq!(summary.functional.skipped, 4);
    assert_eq!(summary.physical, None);

    let db = database_summary(&conn).unwrap();
    assert_eq!(db.protein_count, 8);
    assert_eq!(db.alias_count, 15);
    assert_eq!(db.network(Network::Functional).unwrap().edge_count, Some(9));
    assert_eq!(db.network(Network::Physical).unwrap().edge_count, None);
}

#[test]
fn reverse_duplicates_collapse_to_one_row_with_max_score() {
    let conn = support::loaded_db(false);

    let rows: Vec<(String, String, i64)> = conn
        .prepare("SELECT p1, p2, score_int FROM edges_func WHERE p1 = ?1 AND p2 IN (?2, ?3) ORDER BY p2;")
        .unwrap()
        .query_map([TP53, MDM2, ATM], |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)))
        .unwrap()
        .collect::<Result<_, _>>()
        .unwrap();

    assert_eq!(
        rows,
        vec![
            (TP53.to_string(), MDM2.to_string(), 999),
            (TP53.to_string(), ATM.to_string(), 960),
        ]
    );
}

#[test]
fn protein_annotation_and_alias_taxon_are_parsed() {
    let conn = support::loaded_db(false);

    let (name, annotation): (String, String) = conn
        .query_row(
            "SELECT preferred_name, annotation FROM proteins WHERE protein_id = ?1;",
            [TP53],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )
        .unwrap();
    assert_eq!(name, "TP53");
    assert_eq!(annotation, "Cellular tumor antigen p53");

    let taxon: String = conn
        .query_row(
            "SELECT DISTINCT taxon_id FROM aliases WHERE protein_id = ?1;",
            [MOUSE_TRP53],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(taxon, "10090");
}

#[test]
fn physical_links_create_the_physical_table() {
    let dir = tempfile::tempdir().unwrap();
    let mut conn = open_db_in_memory().unwrap();

    let summary = load_database(&mut conn, &fixture_options(dir.path(), true)).unwrap();

    assert_eq!(summary.physical.unwrap().accepted, 2);
    let db = database_summary(&conn).unwrap();
    assert_eq!(db.network(Network::Physical).unwrap().edge_count, Some(2));
}

#[test]
fn reloading_replaces_previous_contents() {
    let dir = tempfile::tempdir().unwrap();
    let mut conn = open_db_in_memory().unwrap();
    load_database(&mut conn, &fixture_options(dir.path(), true)).unwrap();

    let smaller = LoadOptions {
        info: write_plain(dir.path(), "info.txt", "9606.A\tA\t10\tfirst\n9606.B\tB\t10\tsecond\n"),
        aliases: write_plain(dir.path(), "aliases.txt", "9606.A\tA\tEnsembl_HGNC\n"),
        links: write_plain(dir.path(), "links.txt", "9606.B 9606.A 700\n"),
        physical: None,
    };
    load_database(&mut conn, &smaller).unwrap();

    let db = database_summary(&conn).unwrap();
    assert_eq!(db.protein_count, 2);
    assert_eq!(db.alias_count, 1);
    assert_eq!(db.network(Network::Functional).unwrap().edge_count, Some(1));
    assert_eq!(db.network(Network::Physical).unwrap().edge_count, None);

    let builder = SubgraphBuilder::new(SqliteEdgeRepository::new(&conn));
    let physical =
        SubgraphRequest::from_input(Network::Physical, 0.4, ExpansionMode::Induced, 300).unwrap();
    let err = builder.build(&["9606.A".to_string()], &physical).unwrap_err();
    assert!(matches!(err, SubgraphError::NetworkUnavailable(Network::Physical)));
}

#[test]
fn reloading_with_physical_links_recreates_the_physical_table() {
    let dir = tempfile::tempdir().unwrap();
    let mut conn = open_db_in_memory().unwrap();
    load_database(&mut conn, &fixture_options(dir.path(), false)).unwrap();
    assert_eq!(
        database_summary(&conn).unwrap().network(Network::Physical).unwrap().edge_count,
        None
    );

    let summary = load_database(&mut conn, &fixture_options(dir.path(), true)).unwrap();

    assert_eq!(summary.physical.unwrap().accepted, 2);
    let db = database_summary(&conn).unwrap();
    assert_eq!(db.network(Network::Physical).unwrap().edge_count, Some(2));
}

#[test]
fn headerless_whitespace_files_use_positional_columns() {
    let dir = tempfile::tempdir().unwrap();
    let mut conn = open_db_in_memory().unwrap();
    let options = LoadOptions {
        info: write_gz(dir.path(), "info.gz", "9606.A A kinase of the thing\n"),
        aliases: write_gz(dir.path(), "aliases.gz", "\n9606.A P00001 UniProt_AC\n# comment\n"),
        links: write_gz(dir.path(), "links.gz", "9606.A 9606.B 412\n"),
        physical: None,
    };

    let summary = load_database(&mut conn, &options).unwrap();
    assert_eq!(summary.aliases.accepted, 1);

    let annotation: String = conn
        .query_row("SELECT annotation FROM proteins WHERE protein_id = '9606.A';", [], |row| {
            row.get(0)
        })
        .unwrap();
    assert_eq!(annotation, "kinase of the thing");
}

#[test]
fn missing_input_file_is_reported_with_its_path() {
    let dir = tempfile::tempdir().unwrap();
    let mut conn = open_db_in_memory().unwrap();
    let mut options = fixture_options(dir.path(), false);
    options.links = dir.path().join("missing.links.txt.gz");

    let err = load_database(&mut conn, &options).unwrap_err();
    match err {
        LoadError::Io { path, .. } => assert_eq!(path, options.links),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn loaded_file_database_opens_read_only() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("string.sqlite");
    {
        let mut conn = open_db(&path).unwrap();
        load_database(&mut conn, &fixture_options(dir.path(), false)).unwrap();
    }

    let conn = open_db_read_only(&path).unwrap();
    let summary = database_summary(&conn).unwrap();
    assert_eq!(summary.protein_count, 8);
}

fn edge_line() -> impl Strategy<Value = (u8, u8, i64)> {
    (0u8..12, 0u8..12, -50i64..1100)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn stored_edges_are_canonical_and_keep_max_score(lines in prop::collection::vec(edge_line(), 1..60)) {
        let dir = tempfile::tempdir().unwrap();
        let text: String = lines
            .iter()
            .map(|(a, b, score)| format!("9606.P{a:02} 9606.P{b:02} {score}\n"))
            .collect();
        let path = write_plain(dir.path(), "links.txt", &text);

        let mut conn = open_db_in_memory().unwrap();
        load_edges(&mut conn, &path, Network::Functional).unwrap();

        let stored = stored_edges(&conn);
        for (p1, p2, score) in &stored {
            prop_assert!(p1 < p2);
            prop_assert!((0..=1000).contains(score));

            let expected = lines
                .iter()
                .filter(|(a, b, s)| {
                    (0..=1000).contains(s)
                        && a != b
                        && ((format!("9606.P{a:02}") == *p1 && format!("9606.P{b:02}") == *p2)
                            || (format!("9606.P{b:02}") == *p1 && format!("9606.P{a:02}") == *p2))
                })
                .map(|(_, _, s)| *s)
                .max();
            prop_assert_eq!(expected, Some(*score));
        }

        let distinct_valid_pairs = lines
            .iter()
            .filter(|(a, b, s)| (0..=1000).contains(s) && a != b)
            .map(|(a, b, _)| (a.min(b), a.max(b)))
            .collect::<std::collections::HashSet<_>>()
            .len();
        prop_assert_eq!(stored.len(), distinct_valid_pairs);
    }
}

fn stored_edges(conn: &Connection) -> Vec<(String, String, i64)> {
    let mut stmt = conn
        .prepare("SELECT p1, p2, score_int FROM edges_func;")
        .unwrap();
    let rows = stmt
        .query_map([], |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)))
        .unwrap()
        .collect::<Result<Vec<_>, _>>()
        .unwrap();
    rows
}
