pub mod binarize;
pub mod grayscale;
pub mod extraction;
pub mod simplification;
pub mod mapping;

pub use binarize::*;
pub use grayscale::*;
pub use extraction::*;
pub use simplification::*;
pub use mapping::*;
