//! Tabularize stage: bracket-delimited document sections into `.tsv` tables.

use crate::config::Config;
use crate::error::{ParseError, Result};
use crate::manifest::Manifest;
use crate::stages::Stage;
use crate::table::Table;
use async_trait::async_trait;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// The one section whose rows carry no column header
const HEADERLESS_SECTION: &str = "Heading";

/// Splits each decompressed document into per-section `.tsv` tables
///
/// A document is a sequence of `[Name]` headers, each followed by
/// newline-delimited, tab-separated rows. Every section becomes
/// `<Name>.tsv` beside its source document; the first row is taken as the
/// column header unless the section is named `Heading`, whose rows are all
/// data. The stage manifest lists every table written.
pub struct Tabularize {
    config: Config,
}

impl Tabularize {
    /// Create the stage over `config`
    pub fn new(config: Config) -> Self {
        Self { config }
    }
}

#[async_trait]
impl Stage for Tabularize {
    fn name(&self) -> &'static str {
        "tabularize"
    }

    fn is_complete(&self) -> bool {
        Manifest::validate_on_disk(&self.config.table_manifest_path(), "tsv")
    }

    async fn run(&self) -> Result<()> {
        let documents = Manifest::load(self.config.unpack_manifest_path())?;
        let mut manifest = Manifest::new(self.config.table_manifest_path());

        for document in documents.entries() {
            let tables = tabularize_document(document)?;
            debug!(document = ?document, tables = tables.len(), "document tabularized");
            for table in tables {
                manifest.push(table);
            }
        }

        info!(
            tables = manifest.len(),
            manifest = ?manifest.path(),
            "documents tabularized"
        );
        manifest.store()
    }
}

/// Parse one document and persist each of its sections as a table
///
/// Returns the paths of the tables written, in document order.
fn tabularize_document(document: &Path) -> Result<Vec<PathBuf>> {
    let text = fs::read_to_string(document)?;
    let dir = document.parent().unwrap_or_else(|| Path::new("."));

    let mut created = Vec::new();
    let mut section: Option<String> = None;
    let mut buffer = String::new();

    for line in text.lines() {
        if line.starts_with('[') {
            if let Some(name) = section.take() {
                if let Some(path) = flush_section(document, dir, &name, &buffer)? {
                    created.push(path);
                }
            }
            buffer.clear();
            let name = line.trim_end().trim_matches(|c| c == '[' || c == ']');
            section = Some(name.to_string());
            continue;
        }
        if section.is_some() {
            buffer.push_str(line);
            buffer.push('\n');
        }
        // lines before the first section header are discarded
    }

    match section {
        Some(name) => {
            if let Some(path) = flush_section(document, dir, &name, &buffer)? {
                created.push(path);
            }
        }
        None => {
            return Err(ParseError::NoSections {
                file: document.to_path_buf(),
            }
            .into());
        }
    }

    Ok(created)
}

/// Parse a closed section's buffered body and write it beside the document
///
/// The header rule depends only on the section's name, whether the section
/// was closed by the next `[` line or by the end of the document. Sections
/// with an empty body produce no table.
fn flush_section(
    document: &Path,
    dir: &Path,
    name: &str,
    body: &str,
) -> Result<Option<PathBuf>> {
    if body.trim().is_empty() {
        warn!(section = name, document = ?document, "skipping empty section");
        return Ok(None);
    }

    let with_header = name != HEADERLESS_SECTION;
    let table = Table::parse(body, with_header).map_err(|e| ParseError::MalformedSection {
        file: document.to_path_buf(),
        section: name.to_string(),
        reason: e.to_string(),
    })?;

    let path = dir.join(format!("{name}.tsv"));
    table.write_tsv(&path)?;
    Ok(Some(path))
}
