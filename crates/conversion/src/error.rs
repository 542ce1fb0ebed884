use serde::Serialize;
use strum::{Display, IntoStaticStr};
use thiserror::Error;

use crate::job::JobStatus;

/// Failure to retrieve the source image bytes
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("image source responded with HTTP {0}")]
    Status(u16),

    #[error("could not read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("unsupported image reference: {0}")]
    UnsupportedReference(String),
}

/// Coarse classification used at the service boundary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display, IntoStaticStr)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ErrorKind {
    Fetch,
    Decode,
    Encoding,
    InvalidRequest,
    NotFound,
    Internal,
}

#[derive(Error, Debug)]
pub enum ConversionError {
    #[error("Failed to fetch image: {0}")]
    Fetch(#[from] FetchError),

    #[error("Unable to decode image: {0}")]
    Decode(#[from] image::ImageError),

    #[error("Failed to encode DXF: {0}")]
    Encoding(#[from] outline::OutlineError),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Job not found: {0}")]
    NotFound(String),

    #[error("No result file for job {0}")]
    ResultNotFound(String),

    #[error("Job {id} failed: {message}")]
    Processing {
        id: String,
        kind: ErrorKind,
        message: String,
    },

    #[error("Invalid job transition from {from} to {to}")]
    InvalidTransition { from: JobStatus, to: JobStatus },

    #[error("Job progress cannot go from {from} back to {to}")]
    ProgressRegression { from: u8, to: u8 },

    #[error("Stage {0} received the wrong input")]
    StageOrder(&'static str),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ConversionError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Fetch(_) => ErrorKind::Fetch,
            Self::Decode(_) => ErrorKind::Decode,
            Self::Encoding(_) => ErrorKind::Encoding,
            Self::InvalidRequest(_) => ErrorKind::InvalidRequest,
            Self::NotFound(_) | Self::ResultNotFound(_) => ErrorKind::NotFound,
            Self::Processing { kind, .. } => *kind,
            Self::InvalidTransition { .. }
            | Self::ProgressRegression { .. }
            | Self::StageOrder(_)
            | Self::Config(_)
            | Self::Io(_) => ErrorKind::Internal,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.kind() == ErrorKind::NotFound
    }
}

pub type Result<T> = std::result::Result<T, ConversionError>;
