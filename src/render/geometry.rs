//! Shared geometry calculations for the canvas layers
//!
//! This module contains constants and math shared between the overlay guide,
//! the image layer and the export watermark. It has no drawing dependencies so
//! the layouts can be tested without rasterizing.

use crate::domain::{MAX_GUIDE_SIDE, OverlayConfig, OverlayKind, Point, Size, clamp_scale_percent};

/// Reference guide constants, in logical pixels unless noted
pub mod guide {
    /// Stroke width for every guide line
    pub const STROKE_WIDTH: f32 = 1.5;
    /// Angle between neighbouring index lines (12 spokes over 360 degrees)
    pub const SPOKE_STEP_DEG: f32 = 30.0;
    /// Number of full-span index lines (each gives two spokes)
    pub const SPOKE_LINES: usize = 6;
    /// Hub circle diameter relative to the guide side
    pub const HUB_FRACTION: f32 = 0.04;
    /// Alignment ring diameter relative to the guide side
    pub const RING_FRACTION: f32 = 2.0 / 3.0;
    /// Opacity of the alignment ring
    pub const RING_OPACITY: f32 = 0.5;
    /// Grid cell size
    pub const GRID_CELL: f32 = 20.0;
    /// Most grid lines on each side of the center, per axis
    pub const MAX_GRID_STEPS: f32 = 2048.0;
}

/// Export watermark constants
pub mod watermark {
    /// Font size relative to the output width
    pub const WIDTH_RATIO: f32 = 0.025;
    /// Smallest font size in output pixels
    pub const MIN_FONT_PX: f32 = 16.0;
    /// Watermark opacity
    pub const OPACITY: f32 = 0.5;
    /// Distance from the bottom-right corner, as a multiple of the font size
    pub const MARGIN_EM: f32 = 0.75;
    /// Bitmap glyph cells per side
    pub const GLYPH_CELLS: usize = 8;
}

/// Shape constants
pub mod shape {
    /// Ellipse bezier approximation constant: 4/3 * (sqrt(2) - 1)
    pub const BEZIER_K: f32 = 0.552_284_8;
}

/// One stroke of the reference guide, in guide-local coordinates (center at origin)
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GuidePrimitive {
    Line { from: Point, to: Point, opacity: f32 },
    Circle { radius: f32, opacity: f32 },
}

/// Where the guide sits inside its container
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GuideLayout {
    pub center: Point,
    /// Side of the square guide box
    pub side: f32,
    pub rotation_deg: f32,
}

/// Square guide box for a container.
///
/// The side comes from the shorter container edge (or `fixed_side`), so the guide
/// is never stretched. The overlay's scale, offset and rotation are applied on top.
pub fn guide_layout(container: Size, fixed_side: Option<f32>, overlay: &OverlayConfig) -> GuideLayout {
    let base = fixed_side
        .filter(|s| s.is_finite() && *s > 0.0)
        .unwrap_or_else(|| container.min_side())
        .min(MAX_GUIDE_SIDE);
    let scale = clamp_scale_percent(overlay.scale_percent) / 100.0;
    GuideLayout {
        center: container.center() + Point::new(overlay.offset_x, overlay.offset_y),
        side: (base * scale).max(0.0),
        rotation_deg: overlay.rotation_deg,
    }
}

/// Strokes making up the guide of the given kind and side length
pub fn guide_primitives(kind: OverlayKind, side: f32) -> Vec<GuidePrimitive> {
    if !(side.is_finite() && side > 0.0) {
        return Vec::new();
    }
    match kind {
        OverlayKind::Indices => index_primitives(side),
        OverlayKind::Grid => grid_primitives(side, guide::GRID_CELL),
    }
}

fn index_primitives(side: f32) -> Vec<GuidePrimitive> {
    let half = side * 0.5;
    let mut out = Vec::with_capacity(guide::SPOKE_LINES + 2);

    // 0 and 90 degrees are the crosshair; the rest fill in the hour positions
    for i in 0..guide::SPOKE_LINES {
        let angle = (i as f32 * guide::SPOKE_STEP_DEG).to_radians();
        let (sin, cos) = angle.sin_cos();
        out.push(GuidePrimitive::Line {
            from: Point::new(-half * cos, -half * sin),
            to: Point::new(half * cos, half * sin),
            opacity: 1.0,
        });
    }

    out.push(GuidePrimitive::Circle {
        radius: side * guide::HUB_FRACTION * 0.5,
        opacity: 1.0,
    });
    out.push(GuidePrimitive::Circle {
        radius: side * guide::RING_FRACTION * 0.5,
        opacity: guide::RING_OPACITY,
    });
    out
}

fn grid_primitives(side: f32, cell: f32) -> Vec<GuidePrimitive> {
    let half = side * 0.5;
    // Lines are laid out symmetrically from the center so the crosshatch stays centered
    let steps = (half / cell).floor().clamp(0.0, guide::MAX_GRID_STEPS) as i32;
    let mut out = Vec::with_capacity((steps as usize * 2 + 1) * 2);
    for k in -steps..=steps {
        let offset = k as f32 * cell;
        out.push(GuidePrimitive::Line {
            from: Point::new(offset, -half),
            to: Point::new(offset, half),
            opacity: 1.0,
        });
        out.push(GuidePrimitive::Line {
            from: Point::new(-half, offset),
            to: Point::new(half, offset),
            opacity: 1.0,
        });
    }
    out
}

/// Scale that fits an image inside `viewport` without cropping, and the fitted size
pub fn fit_contain(image_width: u32, image_height: u32, viewport: Size) -> Option<(f32, Size)> {
    if image_width == 0 || image_height == 0 || !viewport.is_drawable() {
        return None;
    }
    let scale = (viewport.width / image_width as f32).min(viewport.height / image_height as f32);
    Some((
        scale,
        Size::new(image_width as f32 * scale, image_height as f32 * scale),
    ))
}

/// Watermark font size for an output image of the given width
#[inline]
pub fn watermark_font_px(output_width: u32) -> f32 {
    (output_width as f32 * watermark::WIDTH_RATIO).max(watermark::MIN_FONT_PX)
}

/// Top-left corner of a watermark anchored to the bottom-right of the output
pub fn watermark_origin(output_width: u32, output_height: u32, chars: usize, font_px: f32) -> Point {
    let margin = font_px * watermark::MARGIN_EM;
    let text_width = chars as f32 * font_px;
    Point::new(
        output_width as f32 - margin - text_width,
        output_height as f32 - margin - font_px,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_guide_is_square_from_shorter_side() {
        let overlay = OverlayConfig::default();
        let layout = guide_layout(Size::new(800.0, 500.0), None, &overlay);
        assert_eq!(layout.side, 500.0);
        assert_eq!(layout.center, Point::new(400.0, 250.0));

        let tall = guide_layout(Size::new(300.0, 900.0), None, &overlay);
        assert_eq!(tall.side, 300.0);

        let fixed = guide_layout(Size::new(800.0, 500.0), Some(256.0), &overlay);
        assert_eq!(fixed.side, 256.0);
    }

    #[test]
    fn test_guide_layout_applies_overlay_geometry() {
        let mut overlay = OverlayConfig::default();
        overlay.scale_percent = 50.0;
        overlay.offset_x = 10.0;
        overlay.offset_y = -5.0;
        overlay.rotation_deg = 15.0;
        let layout = guide_layout(Size::new(400.0, 400.0), None, &overlay);
        assert_eq!(layout.side, 200.0);
        assert_eq!(layout.center, Point::new(210.0, 195.0));
        assert_eq!(layout.rotation_deg, 15.0);
    }

    #[test]
    fn test_indices_have_twelve_spokes_and_two_circles() {
        let prims = guide_primitives(OverlayKind::Indices, 300.0);
        let lines: Vec<_> = prims
            .iter()
            .filter_map(|p| match p {
                GuidePrimitive::Line { from, to, .. } => Some((*from, *to)),
                _ => None,
            })
            .collect();
        assert_eq!(lines.len() * 2, 12);
        for (from, to) in &lines {
            assert!((from.distance(*to) - 300.0).abs() < 1e-3);
            // Every line passes through the center
            assert!((from.x + to.x).abs() < 1e-3 && (from.y + to.y).abs() < 1e-3);
        }
        // Horizontal and vertical crosshair are present
        assert!(lines.iter().any(|(f, t)| (f.y - t.y).abs() < 1e-3));
        assert!(lines.iter().any(|(f, t)| (f.x - t.x).abs() < 1e-3));

        let radii: Vec<_> = prims
            .iter()
            .filter_map(|p| match p {
                GuidePrimitive::Circle { radius, opacity } => Some((*radius, *opacity)),
                _ => None,
            })
            .collect();
        assert_eq!(radii.len(), 2);
        assert!((radii[0].0 - 6.0).abs() < 1e-4);
        assert!((radii[1].0 - 100.0).abs() < 1e-3);
        assert_eq!(radii[1].1, guide::RING_OPACITY);
    }

    #[test]
    fn test_grid_is_centered_with_fixed_cell() {
        let prims = guide_primitives(OverlayKind::Grid, 100.0);
        // offsets -40..=40 step 20 -> 5 vertical and 5 horizontal lines
        assert_eq!(prims.len(), 10);
        let mut xs: Vec<f32> = prims
            .iter()
            .filter_map(|p| match p {
                GuidePrimitive::Line { from, to, .. } if from.x == to.x => Some(from.x),
                _ => None,
            })
            .collect();
        xs.sort_by(f32::total_cmp);
        assert_eq!(xs, vec![-40.0, -20.0, 0.0, 20.0, 40.0]);
    }

    #[test]
    fn test_oversized_guide_is_bounded() {
        let mut overlay = OverlayConfig::default();
        overlay.scale_percent = 1e12;
        let layout = guide_layout(Size::new(400.0, 400.0), Some(f32::MAX), &overlay);
        assert!(layout.side.is_finite());
        assert!(layout.side <= MAX_GUIDE_SIDE * 4.0);

        let lines = guide_primitives(OverlayKind::Grid, f32::MAX).len();
        assert_eq!(lines, (guide::MAX_GRID_STEPS as usize * 2 + 1) * 2);
    }

    #[test]
    fn test_every_kind_produces_a_guide() {
        for kind in [OverlayKind::Indices, OverlayKind::Grid] {
            assert!(!guide_primitives(kind, 50.0).is_empty(), "{kind} is empty");
            assert!(guide_primitives(kind, 0.0).is_empty());
        }
    }

    #[test]
    fn test_fit_contain() {
        let (scale, size) = fit_contain(2000, 1000, Size::new(500.0, 500.0)).unwrap();
        assert_eq!(scale, 0.25);
        assert_eq!(size, Size::new(500.0, 250.0));
        assert!(fit_contain(0, 10, Size::new(1.0, 1.0)).is_none());
    }

    #[test]
    fn test_watermark_size_has_floor() {
        assert_eq!(watermark_font_px(100), watermark::MIN_FONT_PX);
        assert_eq!(watermark_font_px(2400), 60.0);
        let origin = watermark_origin(2400, 1800, 4, 60.0);
        assert_eq!(origin, Point::new(2400.0 - 45.0 - 240.0, 1800.0 - 45.0 - 60.0));
    }
}
