//! Shared utilities for the Easel Studio workspace.

pub mod profiling;
pub mod raster;

pub use raster::{compare, Comparison, Raster, RgbaBuffer};
