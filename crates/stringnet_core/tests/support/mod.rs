//! Shared STRING-like fixture for integration tests.
#![allow(dead_code)]

use flate2::write::GzEncoder;
use flate2::Compression;
use rusqlite::Connection;
use std::io::Write;
use std::path::{Path, PathBuf};
use stringnet_core::db::open_db_in_memory;
use stringnet_core::load::{load_database, LoadOptions};

pub const TP53: &str = "9606.ENSP0001";
pub const BRCA1: &str = "9606.ENSP0002";
pub const MDM2: &str = "9606.ENSP0003";
pub const ATM: &str = "9606.ENSP0004";
pub const CHEK2: &str = "9606.ENSP0005";
pub const BARD1: &str = "9606.ENSP0006";
pub const RAD51: &str = "9606.ENSP0007";
pub const MOUSE_TRP53: &str = "10090.ENSMUSP0001";

pub const INFO: &str = "\
#string_protein_id\tpreferred_name\tprotein_size\tannotation
9606.ENSP0001\tTP53\t393\tCellular tumor antigen p53
9606.ENSP0002\tBRCA1\t1863\tBreast cancer type 1 susceptibility protein
9606.ENSP0003\tMDM2\t491\tE3 ubiquitin-protein ligase Mdm2
9606.ENSP0004\tATM\t3056\tSerine-protein kinase ATM
9606.ENSP0005\tCHEK2\t543\tSerine/threonine-protein kinase Chk2
9606.ENSP0006\tBARD1\t777\tBRCA1-associated RING domain protein 1
9606.ENSP0007\tRAD51\t339\tDNA repair protein RAD51 homolog 1
10090.ENSMUSP0001\tTrp53\t387\tCellular tumor antigen p53
";

pub const ALIASES: &str = "\
#string_protein_id\talias\tsource
9606.ENSP0001\tTP53\tEnsembl_HGNC
9606.ENSP0001\tP04637\tUniProt_AC
9606.ENSP0001\tp53\tBLAST_UniProt
9606.ENSP0001\tTP53\tBioMart_HUGO
9606.ENSP0002\tBRCA1\tEnsembl_HGNC
9606.ENSP0003\tMDM2\tEnsembl_HGNC
9606.ENSP0003\t9606.ENSP0002\tEnsembl
9606.ENSP0004\tATM\tEnsembl_HGNC
9606.ENSP0004\tSHARED1\tRefSeq
9606.ENSP0005\tCHEK2\tEnsembl_HGNC
9606.ENSP0005\tSHARED1\tEnsembl_HGNC
9606.ENSP0006\tBARD1\tEnsembl_HGNC
9606.ENSP0007\tRAD51\tEnsembl_HGNC
10090.ENSMUSP0001\tTrp53\tEnsembl_MGI
10090.ENSMUSP0001\tp53\tBLAST_UniProt
";

pub const LINKS: &str = "\
protein1 protein2 combined_score
9606.ENSP0001 9606.ENSP0003 999
9606.ENSP0003 9606.ENSP0001 999
9606.ENSP0001 9606.ENSP0004 950
9606.ENSP0004 9606.ENSP0001 960
9606.ENSP0001 9606.ENSP0005 920
9606.ENSP0002 9606.ENSP0006 990
9606.ENSP0007 9606.ENSP0002 910
9606.ENSP0002 9606.ENSP0004 905
9606.ENSP0001 9606.ENSP0002 850
9606.ENSP0003 9606.ENSP0004 300
9606.ENSP0001 9606.ENSP0007 500
9606.ENSP0001 9606.ENSP0001 999
9606.ENSP0001 9606.ENSP0006 high
9606.ENSP0001 9606.ENSP0006 1200
9606.ENSP0001
";

pub const PHYSICAL_LINKS: &str = "\
protein1 protein2 combined_score
9606.ENSP0003 9606.ENSP0001 800
9606.ENSP0002 9606.ENSP0006 970
";

/// Writes `content` gzip-compressed to `dir/name`.
pub fn write_gz(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    let file = std::fs::File::create(&path).unwrap();
    let mut encoder = GzEncoder::new(file, Compression::default());
    encoder.write_all(content.as_bytes()).unwrap();
    encoder.finish().unwrap();
    path
}

pub fn write_plain(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, content).unwrap();
    path
}

/// Writes the fixture files into `dir`; aliases stay uncompressed.
pub fn fixture_options(dir: &Path, with_physical: bool) -> LoadOptions {
    LoadOptions {
        info: write_gz(dir, "9606.protein.info.txt.gz", INFO),
        aliases: write_plain(dir, "9606.protein.aliases.txt", ALIASES),
        links: write_gz(dir, "9606.protein.links.txt.gz", LINKS),
        physical: with_physical
            .then(|| write_gz(dir, "9606.protein.physical.links.txt.gz", PHYSICAL_LINKS)),
    }
}

/// In-memory database loaded with the fixture.
pub fn loaded_db(with_physical: bool) -> Connection {
    let dir = tempfile::tempdir().unwrap();
    let mut conn = open_db_in_memory().unwrap();
    load_database(&mut conn, &fixture_options(dir.path(), with_physical)).unwrap();
    conn
}

pub fn ids(values: &[&str]) -> Vec<String> {
    values.iter().map(|value| value.to_string()).collect()
}
