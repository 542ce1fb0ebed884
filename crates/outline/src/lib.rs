//! # Raster Outline Tracing Library
//!
//! Turns a grayscale image into closed polygons and writes them as DXF
//! polylines for cutting and CAD workflows.
//!
//! The pipeline runs four stages, each behind a trait so it can be replaced:
//!
//! - **Binarize** ([`MaskBinarizer`]): global threshold with optional inversion
//! - **Extract** ([`BoundaryExtractor`]): outer boundaries of foreground regions only
//! - **Simplify** ([`PolygonSimplifier`]): closed Douglas-Peucker, tolerance relative to perimeter
//! - **Map** ([`CoordinateMapper`]): flip the raster Y axis into drawing space
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use outline::{DocumentProfile, DrawingUnit, DxfEncoder, Pipeline};
//!
//! let image = image::open("logo.png")?.to_luma8();
//! let outline = Pipeline::builder()
//!     .with_threshold(60, false)
//!     .build()
//!     .process(&image);
//!
//! let encoder = DxfEncoder::new(DocumentProfile::R12, DrawingUnit::Mm, 0.3);
//! outline.save_dxf(&encoder, "logo.dxf")?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

// Core modules
pub mod error;
pub mod types;
pub mod traits;
pub mod algorithms;
pub mod pipeline;
pub mod io;

// Re-exports for convenience
pub use error::{OutlineError, Result};
pub use types::{Boundary, ComputedOutline, DrawingPolygon, SimplifiedPolygon};
pub use traits::*;
pub use algorithms::*;
pub use pipeline::{Pipeline, builder::PipelineBuilder};
pub use io::*;
