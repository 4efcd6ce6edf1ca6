use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub type DefResult<T> = Result<T, DefError>;

/// History direction that ran out of snapshots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HistoryOperation {
    Undo,
    Redo,
}

impl std::fmt::Display for HistoryOperation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Undo => f.write_str("undo"),
            Self::Redo => f.write_str("redo"),
        }
    }
}

#[derive(Debug, Error)]
pub enum DefError {
    #[error("ring count directive `NUR` is missing")]
    MissingRingCount,

    #[error("ring count directive `NUR` has invalid value `{token}`")]
    InvalidRingCount { token: String },

    #[error("radius axis `RADI` could not be established")]
    MissingRadiusAxis,

    #[error("parse error: {0}")]
    Parse(String),

    #[error("failed to access `{}`: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("history list is exhausted: nothing to {operation}")]
    HistoryExhausted { operation: HistoryOperation },

    #[error("polynomial fit failed: {0}")]
    FitFailure(String),

    #[error("series `{name}` has {len} rings but NUR declares {declared}")]
    ReconciliationAmbiguity {
        name: String,
        len: usize,
        declared: usize,
    },

    #[error("parameter `{0}` is not defined in the document")]
    UnknownParameter(String),

    #[error("parameter `{0}` is already in the working set")]
    DuplicateParameter(String),

    #[error("invalid data: {0}")]
    InvalidData(String),
}

impl DefError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Returns `true` for errors that are surfaced as user notices and leave
    /// the loaded document usable.
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        !matches!(
            self,
            Self::MissingRingCount
                | Self::InvalidRingCount { .. }
                | Self::MissingRadiusAxis
                | Self::Parse(_)
                | Self::Io { .. }
        )
    }
}
