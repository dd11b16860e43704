//! Trim stage: remove the fixed annotation columns from every Probes table.

use crate::config::Config;
use crate::error::{Result, SchemaError};
use crate::manifest::Manifest;
use crate::stages::Stage;
use crate::table::{Table, UnknownColumn};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tracing::info;

/// Annotation columns stripped from every Probes table
const DROPPED_COLUMNS: [&str; 7] = [
    "Definition",
    "Ontology_Component",
    "Ontology_Process",
    "Ontology_Function",
    "Synonyms",
    "Obsolete_Probe_Id",
    "Probe_Sequence",
];

/// File name of the reduced table written beside each Probes table
const REDUCED_TABLE_NAME: &str = "Probes_reduced.tsv";

/// Writes a `Probes_reduced.tsv` beside every `Probes.tsv` table
///
/// Only manifest entries whose file name contains `Probes.tsv` are
/// processed; everything else is left untouched. Dropping is strict:
/// a Probes table missing any of the seven annotation columns fails the
/// run with a [`SchemaError`]. The stage shares its manifest file with
/// tabularize: it loads the list, appends the reduced paths in memory,
/// and stores the result in one write, so reruns cannot duplicate entries.
pub struct Trim {
    config: Config,
}

impl Trim {
    /// Create the stage over `config`
    pub fn new(config: Config) -> Self {
        Self { config }
    }
}

#[async_trait]
impl Stage for Trim {
    fn name(&self) -> &'static str {
        "trim"
    }

    fn is_complete(&self) -> bool {
        let Ok(manifest) = Manifest::load(self.config.table_manifest_path()) else {
            return false;
        };
        // Every entry re-validates as a .tsv, the untouched ones included.
        if !manifest.validate("tsv") {
            return false;
        }
        manifest
            .entries()
            .iter()
            .filter(|entry| is_probes_table(entry))
            .all(|entry| manifest.contains(&entry.with_file_name(REDUCED_TABLE_NAME)))
    }

    async fn run(&self) -> Result<()> {
        let manifest = Manifest::load(self.config.table_manifest_path())?;

        // Rebuild from the table entries alone; reduced paths from a partial
        // prior attempt are re-derived rather than trusted.
        let tables: Vec<PathBuf> = manifest
            .entries()
            .iter()
            .filter(|entry| !is_reduced_table(entry))
            .cloned()
            .collect();

        let mut rebuilt = Manifest::new(self.config.table_manifest_path());
        for table in &tables {
            rebuilt.push(table.clone());
        }

        let mut reduced_count = 0usize;
        for table_path in tables.iter().filter(|entry| is_probes_table(entry)) {
            let table = Table::read_tsv(table_path, true)?;
            let reduced = table.drop_columns(&DROPPED_COLUMNS).map_err(
                |UnknownColumn(column)| SchemaError::MissingColumn {
                    file: table_path.clone(),
                    column,
                },
            )?;

            let reduced_path = table_path.with_file_name(REDUCED_TABLE_NAME);
            reduced.write_tsv(&reduced_path)?;
            rebuilt.push(reduced_path);
            reduced_count += 1;
        }

        info!(
            reduced = reduced_count,
            dropped_columns = DROPPED_COLUMNS.len(),
            "probes tables reduced"
        );
        rebuilt.store()
    }
}

fn is_probes_table(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| name.contains("Probes.tsv"))
}

fn is_reduced_table(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| name == REDUCED_TABLE_NAME)
}
