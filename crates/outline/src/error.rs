use thiserror::Error;

#[derive(Error, Debug)]
pub enum OutlineError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Unsupported DXF version: {0} (expected R12 or R2000)")]
    UnsupportedProfile(String),

    #[error("Unsupported drawing unit: {0} (expected mm or cm)")]
    UnsupportedUnit(String),

    #[error("Malformed DXF: {0}")]
    MalformedDxf(String),
}

pub type Result<T> = std::result::Result<T, OutlineError>;
