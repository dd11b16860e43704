//! # geo-etl
//!
//! Idempotent batch pipeline for GEO microarray supplementary archives.
//!
//! The pipeline fetches a dataset's `_RAW.tar` archive, expands it and
//! decompresses the gzipped member documents, splits each document's
//! bracket-delimited sections into tab-separated tables, strips a fixed set
//! of annotation columns from the Probes tables, and finally sweeps the
//! temporary text artifacts into a readme summary.
//!
//! ## Design Philosophy
//!
//! - **Idempotent** - every stage exposes a completion predicate over its
//!   on-disk output; re-running the pipeline re-executes only what is missing
//! - **Sensible defaults** - runs the reference dataset (GSE68849) with zero
//!   configuration
//! - **Library-first** - no CLI or UI, purely a Rust crate for embedding
//! - **Fail-fast** - no internal retry; any stage error terminates the run,
//!   and recovery is simply running the pipeline again
//!
//! ## Quick Start
//!
//! ```no_run
//! use geo_etl::{Config, Pipeline};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config {
//!         dataset: "GSE68849".to_string(),
//!         ..Default::default()
//!     };
//!
//!     let pipeline = Pipeline::new(config)?;
//!     for report in pipeline.run().await? {
//!         println!("{}: {:?}", report.stage, report.action);
//!     }
//!
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// Configuration types
pub mod config;
/// Error types
pub mod error;
/// Stage manifests (ordered path lists)
pub mod manifest;
/// Pipeline stages and the sequential driver
pub mod stages;
/// Tab-separated tables
pub mod table;

// Re-export commonly used types
pub use config::Config;
pub use error::{Error, ParseError, Result, SchemaError};
pub use manifest::Manifest;
pub use stages::{
    Cleanup, Fetch, Pipeline, Stage, StageAction, StageReport, Tabularize, Trim, Unpack,
};
pub use table::{Table, UnknownColumn};
