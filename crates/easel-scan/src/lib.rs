//! Resource scanner that loads Easel Studio assets from storage roots.

mod scan;

pub use scan::*;
