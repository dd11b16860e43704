//! Pipeline stages and the sequential driver.
//!
//! The pipeline is an explicit chain of five stages (fetch, unpack,
//! tabularize, trim, cleanup), each exposing a completion predicate and a
//! run operation. The driver walks the chain in dependency order and runs
//! only what is not already settled, which is the entire idempotence story:
//! a crash is recovered by re-running the pipeline, not by in-process retry.

mod cleanup;
mod fetch;
mod tabularize;
mod trim;
mod unpack;

// Re-exports
pub use cleanup::Cleanup;
pub use fetch::Fetch;
pub use tabularize::Tabularize;
pub use trim::Trim;
pub use unpack::Unpack;

use crate::config::Config;
use crate::error::{Error, Result};
use async_trait::async_trait;
use tracing::{debug, info};

/// One step of the dataset pipeline
///
/// A stage owns exactly one output artifact. `is_complete` inspects that
/// artifact on disk and nothing else; `run` rebuilds it from the previous
/// stage's artifact, truncating any partial output from an earlier attempt.
#[async_trait]
pub trait Stage: Send + Sync {
    /// Stable stage name used in logs and reports
    fn name(&self) -> &'static str;

    /// Completion predicate, evaluated against the stage's on-disk output
    ///
    /// Filesystem trouble while checking means "not complete", never an
    /// error: the predicate decides whether to run, it does not fail runs.
    fn is_complete(&self) -> bool;

    /// Execute the stage
    ///
    /// Must tolerate re-entry after a partial prior attempt without
    /// corrupting state (existing outputs are overwritten, not appended to).
    async fn run(&self) -> Result<()>;
}

/// What the driver did with one stage
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StageAction {
    /// The stage's output (or a later stage's) was already in place
    Skipped,
    /// The stage executed and its completion predicate now holds
    Ran,
}

/// Per-stage outcome of one driver pass
#[derive(Clone, Debug)]
pub struct StageReport {
    /// The stage's name
    pub stage: &'static str,
    /// Whether the stage ran or was skipped
    pub action: StageAction,
}

/// The five-stage dataset pipeline
///
/// Owns a [`Config`] and drives the stages in fixed order. Construction
/// validates the configuration so a bad accession or base URL fails before
/// any network or filesystem work.
pub struct Pipeline {
    config: Config,
}

impl Pipeline {
    /// Create a pipeline over a validated configuration
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// The pipeline's configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Run every unsettled stage in dependency order
    ///
    /// Returns one report per stage. Any stage failure propagates
    /// immediately; a stage whose predicate is still false after its own
    /// run aborts with [`Error::StageIncomplete`].
    pub async fn run(&self) -> Result<Vec<StageReport>> {
        let stages: Vec<Box<dyn Stage>> = vec![
            Box::new(Fetch::new(self.config.clone())),
            Box::new(Unpack::new(self.config.clone())),
            Box::new(Tabularize::new(self.config.clone())),
            Box::new(Trim::new(self.config.clone())),
            Box::new(Cleanup::new(self.config.clone())),
        ];
        drive(&stages).await
    }
}

/// Walk the stage chain, running everything after the furthest complete stage
///
/// Later stages consume (and the final stage deletes) earlier stages'
/// artifacts, so a complete downstream stage settles everything before it.
/// This mirrors dependency-runner semantics, where a complete task never
/// re-schedules its ancestors: after a fully successful pass only the final
/// readme survives, and the next pass must skip all five stages rather than
/// re-fetch and re-extract.
pub(crate) async fn drive(stages: &[Box<dyn Stage>]) -> Result<Vec<StageReport>> {
    let resume_at = stages
        .iter()
        .rposition(|stage| stage.is_complete())
        .map_or(0, |index| index + 1);

    let mut reports = Vec::with_capacity(stages.len());
    for (index, stage) in stages.iter().enumerate() {
        if index < resume_at {
            debug!(stage = stage.name(), "stage already satisfied, skipping");
            reports.push(StageReport {
                stage: stage.name(),
                action: StageAction::Skipped,
            });
            continue;
        }
        info!(stage = stage.name(), "running stage");
        stage.run().await?;
        if !stage.is_complete() {
            return Err(Error::StageIncomplete {
                stage: stage.name(),
                reason: "completion predicate still unsatisfied after run".to_string(),
            });
        }
        reports.push(StageReport {
            stage: stage.name(),
            action: StageAction::Ran,
        });
    }
    Ok(reports)
}
