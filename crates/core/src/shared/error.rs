use std::path::{Path, PathBuf};

use thiserror::Error;

/// Failure kinds surfaced by the segment/variant pipelines.
///
/// Every variant is terminal for the run that produced it; nothing is retried.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("cannot open source {path}: {reason}")]
    SourceUnavailable { path: PathBuf, reason: String },
    #[error("cannot open writer for {path}: {reason}")]
    EncodeInitFailed { path: PathBuf, reason: String },
    #[error("expected artifact is missing: {path}")]
    ArtifactMissing { path: PathBuf },
    #[error("decode failed for {path}: {reason}")]
    Decode { path: PathBuf, reason: String },
    #[error("encode failed for {path}: {reason}")]
    Encode { path: PathBuf, reason: String },
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl PipelineError {
    pub fn source_unavailable(path: &Path, reason: impl ToString) -> Self {
        Self::SourceUnavailable {
            path: path.to_path_buf(),
            reason: reason.to_string(),
        }
    }

    pub fn encode_init(path: &Path, reason: impl ToString) -> Self {
        Self::EncodeInitFailed {
            path: path.to_path_buf(),
            reason: reason.to_string(),
        }
    }

    pub fn decode(path: &Path, reason: impl ToString) -> Self {
        Self::Decode {
            path: path.to_path_buf(),
            reason: reason.to_string(),
        }
    }

    pub fn encode(path: &Path, reason: impl ToString) -> Self {
        Self::Encode {
            path: path.to_path_buf(),
            reason: reason.to_string(),
        }
    }
}
