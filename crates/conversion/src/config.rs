use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::{
    error::{ConversionError, Result},
    request::ConversionDefaults,
};

/// Environment variable overriding [`ServiceConfig::data_dir`]
pub const DATA_DIR_ENV: &str = "PNG_TO_DXF_DATA_DIR";

/// Process configuration for the conversion service
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(default)]
pub struct ServiceConfig {
    /// Directory where DXF results are written
    pub data_dir: PathBuf,
    /// Upper bound on fetching a remote image
    pub fetch_timeout_secs: u64,
    /// Public base URL; when set, completed jobs carry a download URL
    pub public_base_url: Option<String>,
    pub defaults: ConversionDefaults,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            data_dir: std::env::temp_dir().join("png-to-dxf"),
            fetch_timeout_secs: 20,
            public_base_url: None,
            defaults: ConversionDefaults::default(),
        }
    }
}

impl ServiceConfig {
    /// Load configuration from a TOML string
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| ConversionError::Config(e.to_string()))
    }

    /// Load configuration from a JSON string
    pub fn from_json(content: &str) -> Result<Self> {
        serde_json::from_str(content).map_err(|e| ConversionError::Config(e.to_string()))
    }

    /// Load a `.toml` or `.json` file, chosen by extension
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => Self::from_toml(&content),
            Some("json") => Self::from_json(&content),
            _ => Err(ConversionError::Config(format!(
                "unsupported config format: {} (use .toml or .json)",
                path.display()
            ))),
        }
    }

    /// Apply environment overrides
    pub fn with_env_overrides(mut self) -> Self {
        if let Some(dir) = std::env::var_os(DATA_DIR_ENV) {
            self.data_dir = PathBuf::from(dir);
        }
        self
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }
}
