//! Configuration types for geo-etl

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use url::Url;

/// Pipeline configuration
///
/// Every field is a plain value with a sensible default, so
/// `Config::default()` runs the reference dataset out of the box. Fields can
/// also be filled from JSON via [`Config::from_json_file`], with missing keys
/// falling back to the same defaults.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Config {
    /// Dataset accession (default: "GSE68849")
    #[serde(default = "default_dataset")]
    pub dataset: String,

    /// Series bucket the dataset belongs to (default: "GSE68nnn")
    #[serde(default = "default_series")]
    pub series: String,

    /// Root directory for all pipeline artifacts (default: "data")
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Repository origin (default: the NCBI GEO mirror). Overridable so
    /// tests and mirrors can point the fetch at another server.
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            dataset: default_dataset(),
            series: default_series(),
            data_dir: default_data_dir(),
            base_url: default_base_url(),
        }
    }
}

impl Config {
    /// Load configuration from a JSON file, filling absent fields with defaults
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        serde_json::from_str(&text).map_err(|e| Error::Config {
            message: format!("invalid configuration JSON in {}: {e}", path.display()),
            key: None,
        })
    }

    /// Validate field values, failing fast before any stage runs
    pub fn validate(&self) -> Result<()> {
        if self.dataset.is_empty() {
            return Err(Error::Config {
                message: "dataset accession must not be empty".to_string(),
                key: Some("dataset".to_string()),
            });
        }
        if self.series.is_empty() {
            return Err(Error::Config {
                message: "dataset series must not be empty".to_string(),
                key: Some("series".to_string()),
            });
        }
        self.download_url().map(drop)
    }

    /// Path of the downloaded archive: `<data_dir>/<dataset>_RAW.tar`
    pub fn archive_path(&self) -> PathBuf {
        self.data_dir.join(format!("{}_RAW.tar", self.dataset))
    }

    /// Root directory the archive members are extracted under
    pub fn extract_root(&self) -> PathBuf {
        self.data_dir.join(&self.dataset)
    }

    /// Manifest of decompressed documents written by the unpack stage
    pub fn unpack_manifest_path(&self) -> PathBuf {
        self.extract_root().join("tmp.txt")
    }

    /// Manifest of table files, shared by the tabularize and trim stages
    pub fn table_manifest_path(&self) -> PathBuf {
        self.extract_root().join("tmp_tsv.txt")
    }

    /// Path of the final readme summarizing created and removed files
    pub fn readme_path(&self) -> PathBuf {
        self.data_dir.join("readme.txt")
    }

    /// Full download URL for the dataset's supplementary archive
    pub fn download_url(&self) -> Result<Url> {
        let raw = format!(
            "{}/geo/series/{}/{}/suppl/{}_RAW.tar",
            self.base_url.trim_end_matches('/'),
            self.series,
            self.dataset,
            self.dataset
        );
        Url::parse(&raw).map_err(|e| Error::Config {
            message: format!("invalid download URL {raw:?}: {e}"),
            key: Some("base_url".to_string()),
        })
    }
}

fn default_dataset() -> String {
    "GSE68849".to_string()
}

fn default_series() -> String {
    "GSE68nnn".to_string()
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("data")
}

fn default_base_url() -> String {
    "https://ftp.ncbi.nlm.nih.gov".to_string()
}
