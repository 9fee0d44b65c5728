//! Image acquisition and composition capture
//!
//! This module contains:
//! - The loaded photo type and its sources (image.rs)
//! - The compositor that rasterizes image + overlay layers (compositor.rs)

pub mod compositor;
pub mod image;

pub use self::compositor::{Composition, Compositor, SkiaCompositor};
pub use self::image::{ImageSource, SourceImage};
