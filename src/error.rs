//! Error types for graph construction, ranking and corpus loading.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RankError {
    #[error("page `{0}` is not part of the corpus")]
    InvalidPage(String),

    #[error("invalid parameter `{name}`: {reason}")]
    InvalidParameter { name: &'static str, reason: String },

    #[error("corpus contains no pages")]
    EmptyCorpus,

    #[error("iterative solver did not converge after {iterations} sweeps (last max delta {delta:.3e})")]
    DidNotConverge { iterations: usize, delta: f64 },

    #[error("I/O error: {source} (path: {path})")]
    Io {
        source: std::io::Error,
        path: PathBuf,
    },

    #[error("config error: {0}")]
    Config(#[from] serde_json::Error),

    #[error("regex error: {0}")]
    Regex(#[from] regex::Error),
}

pub type Result<T> = std::result::Result<T, RankError>;

impl RankError {
    pub(crate) fn invalid(name: &'static str, reason: impl Into<String>) -> Self {
        RankError::InvalidParameter {
            name,
            reason: reason.into(),
        }
    }
}

impl From<walkdir::Error> for RankError {
    fn from(e: walkdir::Error) -> Self {
        let path = e
            .path()
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("<unknown>"));
        let source = e
            .into_io_error()
            .unwrap_or_else(|| std::io::Error::new(std::io::ErrorKind::Other, "directory walk loop"));
        RankError::Io { source, path }
    }
}

/// Reject damping factors outside `[0, 1]` (including NaN).
pub(crate) fn check_damping(damping: f64) -> Result<()> {
    if (0.0..=1.0).contains(&damping) {
        Ok(())
    } else {
        Err(RankError::invalid(
            "damping",
            format!("must be within [0, 1], got {damping}"),
        ))
    }
}

pub(crate) fn check_tolerance(tolerance: f64) -> Result<()> {
    if tolerance.is_finite() && tolerance > 0.0 {
        Ok(())
    } else {
        Err(RankError::invalid(
            "tolerance",
            format!("must be a positive finite number, got {tolerance}"),
        ))
    }
}

pub(crate) fn check_at_least_one(name: &'static str, value: usize) -> Result<()> {
    if value >= 1 {
        Ok(())
    } else {
        Err(RankError::invalid(name, "must be at least 1"))
    }
}
