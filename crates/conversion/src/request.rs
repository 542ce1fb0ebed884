use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use outline::{DocumentProfile, DrawingUnit, DEFAULT_THRESHOLD_PERCENT};

/// Stroke width used when none is requested, in millimetres
pub const DEFAULT_LINE_WIDTH_MM: f64 = 0.3;

/// Values applied to request fields the caller leaves out
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(default)]
pub struct ConversionDefaults {
    pub unit: String,
    pub dxf_version: String,
    pub threshold: u8,
    pub invert: bool,
    pub line_width: f64,
}

impl Default for ConversionDefaults {
    fn default() -> Self {
        Self {
            unit: DrawingUnit::default().to_string(),
            dxf_version: DocumentProfile::default().to_string(),
            threshold: DEFAULT_THRESHOLD_PERCENT,
            invert: false,
            line_width: DEFAULT_LINE_WIDTH_MM,
        }
    }
}

/// A request to convert one image into a DXF outline file.
///
/// `unit` and `dxf_version` are kept as the caller sent them; unsupported
/// values fail the job before any stage runs.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ConversionRequest {
    #[schemars(description = "Remote image URL, file:// URL or local path")]
    pub image_url: String,

    #[serde(default = "default_unit")]
    #[schemars(description = "Drawing unit declared in the DXF header: mm or cm")]
    pub unit: String,

    #[serde(default = "default_dxf_version")]
    #[schemars(description = "DXF profile: R12 or R2000")]
    pub dxf_version: String,

    #[serde(default = "default_threshold")]
    #[schemars(
        description = "Binarization threshold in percent of full scale",
        range(min = 0, max = 100)
    )]
    pub threshold: u8,

    #[serde(default)]
    #[schemars(description = "Trace dark shapes on a light background instead")]
    pub invert: bool,

    #[serde(default = "default_line_width")]
    #[schemars(description = "Stroke width in millimetres", range(min = 0.0))]
    pub line_width: f64,
}

fn default_unit() -> String {
    ConversionDefaults::default().unit
}

fn default_dxf_version() -> String {
    ConversionDefaults::default().dxf_version
}

fn default_threshold() -> u8 {
    DEFAULT_THRESHOLD_PERCENT
}

fn default_line_width() -> f64 {
    DEFAULT_LINE_WIDTH_MM
}

impl ConversionRequest {
    pub fn new(image_url: impl Into<String>) -> Self {
        Self::with_defaults(image_url, &ConversionDefaults::default())
    }

    pub fn with_defaults(image_url: impl Into<String>, defaults: &ConversionDefaults) -> Self {
        Self {
            image_url: image_url.into(),
            unit: defaults.unit.clone(),
            dxf_version: defaults.dxf_version.clone(),
            threshold: defaults.threshold,
            invert: defaults.invert,
            line_width: defaults.line_width,
        }
    }
}
