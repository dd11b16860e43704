//! Unpack stage: tar members into per-member directories, inner gzip
//! decompression, and the manifest of decompressed documents.

use crate::config::Config;
use crate::error::{Error, Result};
use crate::manifest::Manifest;
use crate::stages::Stage;
use async_trait::async_trait;
use flate2::read::GzDecoder;
use std::fs::{self, File};
use std::io;
use std::path::PathBuf;
use tokio::task::spawn_blocking;
use tracing::{debug, info};

/// Expands the downloaded archive under `<data_dir>/<dataset>/`
///
/// Every member gets a dedicated directory named after the member minus its
/// final extension. Members ending in `.gz` are additionally decompressed
/// into a sibling file (the compressed copy is then removed) and recorded in
/// the stage manifest; other members are extracted as-is and deliberately
/// produce no manifest entry. Only decompressed documents feed the next
/// stage.
pub struct Unpack {
    config: Config,
}

impl Unpack {
    /// Create the stage over `config`
    pub fn new(config: Config) -> Self {
        Self { config }
    }
}

#[async_trait]
impl Stage for Unpack {
    fn name(&self) -> &'static str {
        "unpack"
    }

    fn is_complete(&self) -> bool {
        Manifest::validate_on_disk(&self.config.unpack_manifest_path(), "txt")
    }

    async fn run(&self) -> Result<()> {
        // Archive expansion is blocking work, same as any other extractor.
        let config = self.config.clone();
        spawn_blocking(move || unpack_archive(&config))
            .await
            .map_err(|e| Error::WorkerFailed {
                stage: "unpack",
                reason: e.to_string(),
            })?
    }
}

const INNER_COMPRESSION_EXT: &str = "gz";

fn unpack_archive(config: &Config) -> Result<()> {
    let archive_path = config.archive_path();
    let extract_root = config.extract_root();
    fs::create_dir_all(&extract_root)?;

    // Fresh manifest every run: a stale list from a failed prior attempt
    // must not leak entries into this one.
    let mut manifest = Manifest::new(config.unpack_manifest_path());

    let mut archive = tar::Archive::new(File::open(&archive_path)?);
    for entry in archive.entries()? {
        let mut entry = entry?;
        let member_name: PathBuf = entry.path()?.into_owned();

        // "X.txt.gz" extracts under a directory named "X.txt".
        let base = member_name.with_extension("");
        let member_dir = extract_root.join(&base);
        fs::create_dir_all(&member_dir)?;

        let raw_path = member_dir.join(&member_name);
        if let Some(parent) = raw_path.parent() {
            fs::create_dir_all(parent)?;
        }
        entry.unpack(&raw_path)?;
        debug!(member = ?member_name, "extracted archive member");

        let is_compressed =
            member_name.extension().and_then(|e| e.to_str()) == Some(INNER_COMPRESSION_EXT);
        if !is_compressed {
            continue;
        }

        let document_path = member_dir.join(&base);
        if let Some(parent) = document_path.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut decoder = GzDecoder::new(File::open(&raw_path)?);
        let mut document = File::create(&document_path)?;
        io::copy(&mut decoder, &mut document)?;
        fs::remove_file(&raw_path)?;
        debug!(document = ?document_path, "decompressed inner member");

        manifest.push(fs::canonicalize(&document_path)?);
    }

    info!(
        documents = manifest.len(),
        manifest = ?manifest.path(),
        "archive unpacked"
    );
    manifest.store()
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;
    use flate2::Compression;
    use flate2::write::GzEncoder;
    use std::io::Write;
    use std::path::Path;

    fn gzip(data: &[u8]) -> Vec<u8> {
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(data).unwrap();
        encoder.finish().unwrap()
    }

    fn build_archive(path: &Path, members: &[(&str, Vec<u8>)]) {
        let mut builder = tar::Builder::new(File::create(path).unwrap());
        for (name, data) in members {
            let mut header = tar::Header::new_gnu();
            header.set_size(data.len() as u64);
            header.set_mode(0o644);
            header.set_cksum();
            builder.append_data(&mut header, name, data.as_slice()).unwrap();
        }
        builder.finish().unwrap();
    }

    fn test_config(data_dir: &Path) -> Config {
        Config {
            data_dir: data_dir.to_path_buf(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn gz_members_are_decompressed_and_listed() {
        let dir = tempfile::tempdir().unwrap();
        let config = test_config(dir.path());
        build_archive(
            &config.archive_path(),
            &[("GSM1_alpha.txt.gz", gzip(b"[Heading]\na\tb\n"))],
        );

        let stage = Unpack::new(config.clone());
        assert!(!stage.is_complete());
        stage.run().await.unwrap();
        assert!(stage.is_complete());

        let member_dir = config.extract_root().join("GSM1_alpha.txt");
        let document = member_dir.join("GSM1_alpha.txt");
        assert_eq!(fs::read_to_string(&document).unwrap(), "[Heading]\na\tb\n");
        assert!(
            !member_dir.join("GSM1_alpha.txt.gz").exists(),
            "compressed copy is removed after decompression"
        );

        let manifest = Manifest::load(config.unpack_manifest_path()).unwrap();
        assert_eq!(manifest.len(), 1);
        assert_eq!(manifest.entries()[0], fs::canonicalize(&document).unwrap());
    }

    #[tokio::test]
    async fn plain_members_are_extracted_but_not_listed() {
        let dir = tempfile::tempdir().unwrap();
        let config = test_config(dir.path());
        build_archive(
            &config.archive_path(),
            &[
                ("GSM1_alpha.txt.gz", gzip(b"[Heading]\na\tb\n")),
                ("notes.pdf", b"not compressed".to_vec()),
            ],
        );

        let stage = Unpack::new(config.clone());
        stage.run().await.unwrap();

        assert!(
            config.extract_root().join("notes").join("notes.pdf").exists(),
            "plain member is still extracted into its own directory"
        );
        let manifest = Manifest::load(config.unpack_manifest_path()).unwrap();
        assert_eq!(manifest.len(), 1, "only the gz member yields an entry");
    }

    #[tokio::test]
    async fn rerun_converges_instead_of_accumulating_entries() {
        let dir = tempfile::tempdir().unwrap();
        let config = test_config(dir.path());
        build_archive(
            &config.archive_path(),
            &[("GSM1_alpha.txt.gz", gzip(b"row\tvalue\n"))],
        );

        let stage = Unpack::new(config.clone());
        stage.run().await.unwrap();
        stage.run().await.unwrap();

        let manifest = Manifest::load(config.unpack_manifest_path()).unwrap();
        assert_eq!(manifest.len(), 1, "second run rewrites, never appends");
        assert!(stage.is_complete());
    }

    #[tokio::test]
    async fn stale_manifest_entry_fails_the_predicate() {
        let dir = tempfile::tempdir().unwrap();
        let config = test_config(dir.path());

        let mut stale = Manifest::new(config.unpack_manifest_path());
        stale.push(dir.path().join("vanished.txt"));
        stale.store().unwrap();

        let stage = Unpack::new(config);
        assert!(!stage.is_complete());
    }
}
