pub mod dxf;

pub use dxf::*;
