//! Pipeline failure taxonomy.

use std::path::PathBuf;
use thiserror::Error;

/// Failure classes of the text-to-audio pipeline.
///
/// Every variant is fatal for the run; completed chunk artifacts stay on
/// disk so a rerun with the same `--tmpdir` can resume.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Input file missing or unreadable, reported before any processing.
    #[error("cannot read input file {path}: {source}")]
    Input {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A required external tool or model is absent.
    #[error("{tool} not available: {hint}")]
    BackendUnavailable { tool: String, hint: String },

    /// The backend invocation for one chunk failed.
    #[error("synthesis failed for chunk {index}: {reason}")]
    Synthesis { index: usize, reason: String },

    /// An artifact could not be decoded during assembly.
    #[error("could not decode audio artifacts: {reason}")]
    ArtifactCorrupt { reason: String },
}
