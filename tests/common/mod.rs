//! Common test utilities for geo-etl E2E tests

use flate2::Compression;
use flate2::write::GzEncoder;
use geo_etl::Config;
use std::io::Write;
use std::path::Path;

/// Column header carrying all seven trimmable annotation columns
#[allow(dead_code)]
pub const PROBES_HEADER: &str = "Probe_Id\tSymbol\tDefinition\tOntology_Component\tOntology_Process\tOntology_Function\tSynonyms\tObsolete_Probe_Id\tProbe_Sequence";

/// A bracket-delimited sample document: `[Heading]` with three header-less
/// rows, then `[Probes]` with a header and five data rows.
#[allow(dead_code)]
pub fn sample_document(sample_id: &str) -> String {
    let mut body = String::new();
    body.push_str("[Heading]\n");
    for i in 1..=3 {
        body.push_str(&format!("{sample_id}\tline{i}\tvalue{i}\n"));
    }
    body.push_str("[Probes]\n");
    body.push_str(PROBES_HEADER);
    body.push('\n');
    for i in 1..=5 {
        body.push_str(&format!(
            "ILMN_{i}\tSYM{i}\tdefinition\tcomponent\tprocess\tfunction\tsynonyms\tobsolete\tACGTACGT\n"
        ));
    }
    body
}

/// Gzip `data`, as the archive's inner members are compressed
#[allow(dead_code)]
pub fn gzip(data: &[u8]) -> Vec<u8> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data).expect("gzip write");
    encoder.finish().expect("gzip finish")
}

/// Build an in-memory tar archive from `(member name, bytes)` pairs
#[allow(dead_code)]
pub fn build_archive(members: &[(&str, Vec<u8>)]) -> Vec<u8> {
    let mut builder = tar::Builder::new(Vec::new());
    for (name, data) in members {
        let mut header = tar::Header::new_gnu();
        header.set_size(data.len() as u64);
        header.set_mode(0o644);
        header.set_cksum();
        builder
            .append_data(&mut header, name, data.as_slice())
            .expect("append member");
    }
    builder.into_inner().expect("finish archive")
}

/// A two-member archive matching the reference end-to-end scenario
#[allow(dead_code)]
pub fn two_member_archive() -> Vec<u8> {
    build_archive(&[
        (
            "GSM100001_alpha.txt.gz",
            gzip(sample_document("GSM100001").as_bytes()),
        ),
        (
            "GSM100002_beta.txt.gz",
            gzip(sample_document("GSM100002").as_bytes()),
        ),
    ])
}

/// Pipeline configuration pointed at a mock server and scratch directory
#[allow(dead_code)]
pub fn test_config(server_uri: &str, data_dir: &Path) -> Config {
    Config {
        base_url: server_uri.to_string(),
        data_dir: data_dir.to_path_buf(),
        ..Default::default()
    }
}
