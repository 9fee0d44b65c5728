//! Pure domain types with minimal dependencies
//!
//! This module contains the state the canvas works on: the image transform,
//! the overlay configuration and the small geometry types shared by gestures
//! and rendering. Nothing here does I/O.

pub mod geometry;
pub mod overlay;
pub mod transform;

pub use geometry::*;
pub use overlay::*;
pub use transform::*;
