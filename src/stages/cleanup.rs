//! Cleanup stage: sweep temporary text artifacts and write the final readme.

use crate::config::Config;
use crate::error::Result;
use crate::manifest::Manifest;
use crate::stages::Stage;
use async_trait::async_trait;
use std::fs;
use std::io;
use tracing::{debug, info};
use walkdir::WalkDir;

/// Marker line introducing the created-files section of the readme
const CREATED_MARKER: &str = "Created files:";

/// Marker line introducing the removed-files section of the readme
const REMOVED_MARKER: &str = "Temporary files removed:";

/// Deletes every `.txt` under the extraction root and writes the readme
///
/// The readme lists the created table paths exactly as the shared manifest
/// recorded them, then the bare names of the removed temporary files. The
/// sweep touches `.txt` files only; the `.tsv` tables sitting in the same
/// directories survive. Both stage manifests are themselves `.txt` files
/// inside the extraction root, so the sweep consumes them too; the created
/// list is read before anything is deleted.
pub struct Cleanup {
    config: Config,
}

impl Cleanup {
    /// Create the stage over `config`
    pub fn new(config: Config) -> Self {
        Self { config }
    }
}

#[async_trait]
impl Stage for Cleanup {
    fn name(&self) -> &'static str {
        "cleanup"
    }

    fn is_complete(&self) -> bool {
        match fs::read_to_string(self.config.readme_path()) {
            Ok(contents) => contents.contains(CREATED_MARKER) && contents.contains(REMOVED_MARKER),
            Err(_) => false,
        }
    }

    async fn run(&self) -> Result<()> {
        let created = Manifest::load(self.config.table_manifest_path())?;

        let mut removed = Vec::new();
        for entry in WalkDir::new(self.config.extract_root()) {
            let entry = entry.map_err(io::Error::from)?;
            if !entry.file_type().is_file() {
                continue;
            }
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("txt") {
                continue;
            }
            fs::remove_file(path)?;
            removed.push(entry.file_name().to_string_lossy().into_owned());
            debug!(?path, "removed temporary file");
        }
        info!(
            created = created.len(),
            removed = removed.len(),
            files = ?removed,
            "cleanup swept temporary files"
        );

        let mut readme = String::new();
        readme.push_str(CREATED_MARKER);
        readme.push('\n');
        for path in created.entries() {
            readme.push_str(&path.to_string_lossy());
            readme.push('\n');
        }
        readme.push('\n');
        readme.push_str(REMOVED_MARKER);
        readme.push('\n');
        for name in &removed {
            readme.push_str(name);
            readme.push('\n');
        }
        fs::write(self.config.readme_path(), readme)?;
        Ok(())
    }
}
