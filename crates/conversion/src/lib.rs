//! Job-tracked PNG to DXF conversion.
//!
//! [`ConversionService`] accepts a [`ConversionRequest`], fetches the image,
//! traces its outlines with the `outline` pipeline and writes a DXF file,
//! recording each step on a [`Job`] that callers can poll.
//!
//! ```no_run
//! use conversion::{ConversionRequest, FsConversionService, ServiceConfig};
//!
//! # async fn run() -> conversion::Result<()> {
//! let service = FsConversionService::from_config(&ServiceConfig::default())?;
//! let job = service.submit(ConversionRequest::new("https://example.com/mask.png")).await?;
//! let file = service.result(&job.id)?;
//! println!("{}", file.path.display());
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod driver;
pub mod error;
pub mod job;
pub mod mcp;
pub mod request;
pub mod results;
pub mod service;
pub mod source;
pub mod store;

pub use config::*;
pub use driver::*;
pub use error::*;
pub use job::*;
pub use request::*;
pub use results::*;
pub use service::*;
pub use source::*;
pub use store::*;
