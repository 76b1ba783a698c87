//! Error taxonomy for the word-discovery pipeline.
//!
//! Four kinds, matching the fatal-error categories the pipeline can hit:
//! I/O on one of the four handoff files, subprocess failure of the
//! external n-gram counter, malformed binary/text input, and invalid
//! configuration caught at construction time.

use std::path::PathBuf;

#[derive(thiserror::Error, Debug)]
pub enum DiscoveryError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("count_ngrams failed (exit code {exit_code:?}): {reason}")]
    Counter {
        exit_code: Option<i32>,
        reason: String,
        stderr_tail: String,
    },

    #[error("malformed input in {path} at byte offset {offset}: {reason}")]
    Format {
        path: PathBuf,
        offset: u64,
        reason: String,
    },

    #[error("invalid configuration: {0}")]
    Config(String),
}

impl DiscoveryError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        DiscoveryError::Io {
            path: path.into(),
            source,
        }
    }

    pub fn format(path: impl Into<PathBuf>, offset: u64, reason: impl Into<String>) -> Self {
        DiscoveryError::Format {
            path: path.into(),
            offset,
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, DiscoveryError>;
