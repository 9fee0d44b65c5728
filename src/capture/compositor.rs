//! Rasterizing the composed view
//!
//! A [`Composition`] describes what is on screen: the photo, its transform, the
//! overlay and the viewport it all sits in. A [`Compositor`] turns that into
//! pixels. Rendering from the description instead of screenshotting a live view
//! keeps export independent of the display's pixel density.

use std::sync::Arc;

use image::RgbaImage;
use tiny_skia::{Color, Pixmap};

use crate::domain::{HexColor, ImageTransform, OverlayConfig, Size};
use crate::error::{Error, Result};
use crate::render;

/// Largest output side in pixels
pub const MAX_OUTPUT_SIDE: u32 = 16_384;

/// Everything visible in the viewport at one moment
#[derive(Clone, Debug)]
pub struct Composition {
    pub viewport: Size,
    pub image: Arc<RgbaImage>,
    pub transform: ImageTransform,
    pub overlay: OverlayConfig,
    /// Fixed guide side; derived from the viewport when absent
    pub guide_side: Option<f32>,
}

pub trait Compositor: Send + Sync {
    /// Rasterize `composition` at `pixel_scale` output pixels per logical pixel,
    /// over an opaque `background`
    fn capture(
        &self,
        composition: &Composition,
        background: HexColor,
        pixel_scale: f32,
    ) -> Result<RgbaImage>;
}

/// CPU compositor built on tiny-skia
#[derive(Debug, Clone, Copy, Default)]
pub struct SkiaCompositor;

impl Compositor for SkiaCompositor {
    fn capture(
        &self,
        composition: &Composition,
        background: HexColor,
        pixel_scale: f32,
    ) -> Result<RgbaImage> {
        if !composition.viewport.is_drawable() {
            return Err(Error::Capture("viewport has no area".to_string()));
        }
        if !(pixel_scale.is_finite() && pixel_scale > 0.0) {
            return Err(Error::Capture(format!("invalid quality scale {pixel_scale}")));
        }
        let (width, height) = composition.viewport.scaled_pixels(pixel_scale);
        if width > MAX_OUTPUT_SIDE || height > MAX_OUTPUT_SIDE {
            return Err(Error::Capture(format!(
                "output {width}x{height} exceeds {MAX_OUTPUT_SIDE}px"
            )));
        }

        let mut canvas = Pixmap::new(width, height)
            .ok_or_else(|| Error::Capture(format!("cannot allocate {width}x{height} canvas")))?;
        canvas.fill(Color::from_rgba8(background.r, background.g, background.b, 255));

        let photo = render::image::pixmap_from_rgba(&composition.image)
            .ok_or_else(|| Error::Capture("image has no pixels".to_string()))?;
        if !render::image::draw_image_layer(
            &mut canvas,
            &photo,
            composition.viewport,
            &composition.transform,
            pixel_scale,
        ) {
            return Err(Error::Capture("image layer could not be placed".to_string()));
        }

        let layout = render::geometry::guide_layout(
            composition.viewport,
            composition.guide_side,
            &composition.overlay,
        );
        render::overlay::draw_guide(&mut canvas, &layout, &composition.overlay, pixel_scale);

        log::debug!("captured composition at {width}x{height}");
        Ok(render::image::rgba_from_pixmap(&canvas))
    }
}
