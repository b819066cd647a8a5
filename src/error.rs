use std::path::PathBuf;
use thiserror::Error;

/// Rejections raised while turning raw peak data into an [`crate::envelope::Envelope`].
#[derive(Debug, Error, Clone, PartialEq)]
pub enum EnvelopeError {
    #[error("envelope is empty")]
    Empty,
    #[error("envelope value at frame {index} is not finite")]
    NotFinite { index: usize },
    #[error("envelope value at frame {index} is negative ({value})")]
    Negative { index: usize, value: f32 },
    #[error("envelope value at frame {index} is not a number")]
    NotNumeric { index: usize },
    #[error("envelope string is not a JSON array: {0}")]
    BadString(String),
    #[error("unsupported envelope encoding: {0}")]
    Unsupported(&'static str),
}

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to read catalog {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse catalog {path}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to encode catalog")]
    Encode(#[source] serde_json::Error),
    #[error("failed to write catalog {path}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("track '{0}' not found in catalog")]
    UnknownTrack(String),
    #[error("track '{id}' has no usable envelope: {source}")]
    BadEnvelope {
        id: String,
        #[source]
        source: EnvelopeError,
    },
}

/// A search was abandoned because a newer invocation superseded it.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("similarity search cancelled")]
pub struct Cancelled;
