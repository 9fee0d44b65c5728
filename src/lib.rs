//! Watch photo QC canvas
//!
//! Pan, zoom, pinch and rotate a watch photo under a fixed reference guide
//! (indices or grid), export the composed view with a watermark, and hand the
//! photo to an external analysis delegate.

pub mod analysis;
pub mod capture;
pub mod config;
pub mod domain;
pub mod error;
pub mod export;
pub mod gesture;
pub mod render;
pub mod session;

pub use error::{Error, ErrorCategory, Result};
