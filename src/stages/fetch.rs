//! Fetch stage: one streamed HTTP GET of the dataset archive, no retry.

use crate::config::Config;
use crate::error::{Error, Result};
use crate::stages::Stage;
use async_trait::async_trait;
use futures::StreamExt;
use std::fs;
use std::path::Path;
use tokio::io::AsyncWriteExt;
use tracing::info;

/// Downloads the dataset archive to `<data_dir>/<dataset>_RAW.tar`
///
/// The fetch is single-attempt: a non-success status fails the run
/// immediately with [`Error::Fetch`]. Skipping an already-downloaded
/// archive is entirely the completion predicate's doing: a non-empty
/// `.tar` at the archive path means there is nothing to do.
pub struct Fetch {
    config: Config,
    client: reqwest::Client,
}

impl Fetch {
    /// Create the stage over `config`
    pub fn new(config: Config) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl Stage for Fetch {
    fn name(&self) -> &'static str {
        "fetch"
    }

    fn is_complete(&self) -> bool {
        archive_is_valid(&self.config.archive_path())
    }

    async fn run(&self) -> Result<()> {
        fs::create_dir_all(&self.config.data_dir)?;

        let url = self.config.download_url()?;
        info!(%url, "downloading dataset archive");

        let response = self.client.get(url.clone()).send().await?;
        if !response.status().is_success() {
            return Err(Error::Fetch {
                status: response.status().as_u16(),
                url: url.to_string(),
            });
        }

        let archive_path = self.config.archive_path();
        let mut file = tokio::fs::File::create(&archive_path).await?;
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            file.write_all(&chunk?).await?;
        }
        file.flush().await?;

        let size_bytes = tokio::fs::metadata(&archive_path).await?.len();
        info!(archive = ?archive_path, size_bytes, "archive downloaded");
        Ok(())
    }
}

fn archive_is_valid(path: &Path) -> bool {
    let Ok(metadata) = fs::metadata(path) else {
        return false;
    };
    metadata.is_file()
        && metadata.len() > 0
        && path.extension().and_then(|e| e.to_str()) == Some("tar")
}
