use clap::{Args, ValueEnum};
use conversion::{ConversionError, ConversionRequest, JobSnapshot, ServiceConfig, DATA_DIR_ENV};
use schemars::schema_for;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CliError {
    #[error(transparent)]
    SerdeError(#[from] serde_json::Error),
    #[error(transparent)]
    ConversionError(#[from] ConversionError),
    #[error("Threshold must be between 0 and 100, got {0}")]
    ThresholdOutOfRange(u8),
}

/// Options of the `convert` subcommand
#[derive(Args, Debug, Clone, PartialEq)]
pub struct ConvertArgs {
    /// Image to convert: http(s) URL, file:// URL or local path
    pub image: String,

    /// Service configuration file (.toml or .json)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Directory the DXF result is written to
    #[arg(long, env = DATA_DIR_ENV)]
    pub data_dir: Option<PathBuf>,

    /// Drawing unit: mm or cm
    #[arg(short, long)]
    pub unit: Option<String>,

    /// DXF profile: R12 or R2000
    #[arg(short = 'v', long)]
    pub dxf_version: Option<String>,

    /// Binarization threshold in percent
    #[arg(short, long)]
    pub threshold: Option<u8>,

    /// Trace dark shapes on a light background
    #[arg(long)]
    pub invert: bool,

    /// Stroke width in millimetres
    #[arg(short, long)]
    pub line_width: Option<f64>,
}

impl ConvertArgs {
    /// Config file (or defaults), then the environment, then flags
    pub fn service_config(&self) -> Result<ServiceConfig, CliError> {
        let mut config = match &self.config {
            Some(path) => ServiceConfig::from_file(path)?,
            None => ServiceConfig::default(),
        }
        .with_env_overrides();

        if let Some(dir) = &self.data_dir {
            config.data_dir = dir.clone();
        }
        Ok(config)
    }

    /// Build the request, filling unset flags from the configured defaults
    pub fn request(&self, config: &ServiceConfig) -> Result<ConversionRequest, CliError> {
        let mut request = ConversionRequest::with_defaults(self.image.clone(), &config.defaults);
        if let Some(unit) = &self.unit {
            request.unit = unit.clone();
        }
        if let Some(version) = &self.dxf_version {
            request.dxf_version = version.clone();
        }
        if let Some(threshold) = self.threshold {
            if threshold > 100 {
                return Err(CliError::ThresholdOutOfRange(threshold));
            }
            request.threshold = threshold;
        }
        request.invert |= self.invert;
        if let Some(line_width) = self.line_width {
            request.line_width = line_width;
        }
        Ok(request)
    }
}

/// Types whose JSON schema the `schema` subcommand can print
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SchemaTarget {
    #[default]
    Request,
    Job,
    Config,
}

pub fn schema_json(target: SchemaTarget) -> Result<String, CliError> {
    let schema = match target {
        SchemaTarget::Request => schema_for!(ConversionRequest),
        SchemaTarget::Job => schema_for!(JobSnapshot),
        SchemaTarget::Config => schema_for!(ServiceConfig),
    };
    Ok(serde_json::to_string_pretty(&schema)?)
}
