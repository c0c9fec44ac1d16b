//! Error kinds reported by the pipeline.

use crate::storage::Namespace;
use std::{io, path::PathBuf};

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Conflicting or missing configuration.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// The degraded and reference sides disagree on their samples.
    #[error("index mismatch: {0}")]
    IndexMismatch(String),

    #[error("unable to fetch '{key}' from the {namespace} namespace: {reason}")]
    Fetch {
        key: String,
        namespace: Namespace,
        reason: String,
    },

    #[error("unable to decode '{key}': {reason}")]
    Decode { key: String, reason: String },

    #[error("index {index} is out of range for a dataset of {len} pairs")]
    OutOfRange { index: usize, len: usize },

    /// A loader worker stopped without delivering its batch.
    #[error("loader failure: {0}")]
    Loader(String),

    #[error("I/O error on '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl Error {
    pub(crate) fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub(crate) fn mismatch(msg: impl Into<String>) -> Self {
        Self::IndexMismatch(msg.into())
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Returns early with [Error::Config] if the condition does not hold.
macro_rules! ensure_config {
    ($cond:expr, $($arg:tt)+) => {
        if !$cond {
            return Err($crate::error::Error::Config(format!($($arg)+)));
        }
    };
}
pub(crate) use ensure_config;
