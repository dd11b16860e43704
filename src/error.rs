//! Error types for geo-etl
//!
//! This module provides error handling for the pipeline, including:
//! - Domain-specific error types (Fetch, Parse, Schema, etc.)
//! - Context information (offending file, section, column, HTTP status)
//!
//! Nothing here is caught or retried inside the library; every error
//! propagates to the caller and terminates the run. Recovery is external:
//! re-run the pipeline and let each stage's completion predicate decide
//! what actually re-executes.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for geo-etl operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for geo-etl
///
/// This is the primary error type used throughout the library. Each variant
/// includes contextual information to help diagnose issues.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error with context about which setting is invalid
    #[error("configuration error: {message}")]
    Config {
        /// Human-readable error message describing the configuration issue
        message: String,
        /// The configuration key that caused the error (e.g., "base_url")
        key: Option<String>,
    },

    /// Remote returned a non-success status for the archive request.
    ///
    /// There is no retry: the fetch is single-attempt by design, and a
    /// non-200 response fails the run immediately.
    #[error("fetch failed with HTTP status {status} for {url}")]
    Fetch {
        /// The HTTP status code returned by the server
        status: u16,
        /// The URL that was requested
        url: String,
    },

    /// Transport-level network error (connection refused, DNS, etc.)
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Section or table content could not be parsed
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    /// Expected column absent while reducing a table
    #[error("schema error: {0}")]
    Schema(#[from] SchemaError),

    /// A blocking worker task panicked or was cancelled
    #[error("{stage} worker task failed: {reason}")]
    WorkerFailed {
        /// The stage whose worker failed
        stage: &'static str,
        /// Why the worker did not complete
        reason: String,
    },

    /// A stage's completion predicate is still false after a successful run
    #[error("stage {stage} incomplete after run: {reason}")]
    StageIncomplete {
        /// The stage that failed to reach completion
        stage: &'static str,
        /// Which part of the predicate is unsatisfied
        reason: String,
    },
}

/// Parse errors for bracket-delimited documents and persisted tables
#[derive(Debug, Error)]
pub enum ParseError {
    /// Tab-separated content inside a section failed to parse
    #[error("malformed section [{section}] in {file}: {reason}")]
    MalformedSection {
        /// The document containing the section
        file: PathBuf,
        /// The section whose body failed to parse
        section: String,
        /// The underlying parse failure
        reason: String,
    },

    /// A persisted table file failed to load
    #[error("malformed table {file}: {reason}")]
    MalformedTable {
        /// The table file that failed to load
        file: PathBuf,
        /// The underlying parse failure
        reason: String,
    },

    /// A document contained no bracket-delimited sections at all
    #[error("no sections found in {file}")]
    NoSections {
        /// The document without sections
        file: PathBuf,
    },
}

/// Schema errors raised while reducing a table
#[derive(Debug, Error)]
pub enum SchemaError {
    /// A column scheduled for removal is not present in the table
    #[error("column {column:?} not found in {file}")]
    MissingColumn {
        /// The table file being reduced
        file: PathBuf,
        /// The column that was expected but absent
        column: String,
    },
}
