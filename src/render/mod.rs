//! Layer rendering module
//!
//! This module contains:
//! - Geometry calculations shared between the layers (no drawing dependencies)
//! - Image layer rendering using tiny-skia
//! - Reference guide rendering using tiny-skia
//! - The export watermark

pub mod geometry;
pub mod image;
pub mod overlay;
pub mod watermark;
