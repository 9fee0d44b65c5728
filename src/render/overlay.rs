//! Reference guide rendering using tiny-skia
//!
//! The guide is drawn in its own pass after the image layer. It depends only on
//! the container size and the overlay configuration, never on the image transform.

use tiny_skia::{LineCap, Paint, PathBuilder, Pixmap, Stroke, Transform};

use super::geometry::{self, GuideLayout, GuidePrimitive, guide, shape};
use crate::domain::OverlayConfig;

/// Build a circle path around the origin using cubic bezier curves
fn build_circle_path(r: f32) -> Option<tiny_skia::Path> {
    let k = r * shape::BEZIER_K;

    let mut pb = PathBuilder::new();
    pb.move_to(0.0, -r);
    pb.cubic_to(k, -r, r, -k, r, 0.0);
    pb.cubic_to(r, k, k, r, 0.0, r);
    pb.cubic_to(-k, r, -r, k, -r, 0.0);
    pb.cubic_to(-r, -k, -k, -r, 0.0, -r);
    pb.close();
    pb.finish()
}

fn build_primitive_path(primitive: &GuidePrimitive) -> Option<tiny_skia::Path> {
    match *primitive {
        GuidePrimitive::Line { from, to, .. } => {
            let mut pb = PathBuilder::new();
            pb.move_to(from.x, from.y);
            pb.line_to(to.x, to.y);
            pb.finish()
        }
        GuidePrimitive::Circle { radius, .. } => build_circle_path(radius),
    }
}

fn primitive_opacity(primitive: &GuidePrimitive) -> f32 {
    match *primitive {
        GuidePrimitive::Line { opacity, .. } | GuidePrimitive::Circle { opacity, .. } => opacity,
    }
}

/// Transform from guide-local coordinates to output pixels
pub fn guide_transform(layout: &GuideLayout, pixel_scale: f32) -> Transform {
    Transform::from_scale(pixel_scale, pixel_scale)
        .pre_translate(layout.center.x, layout.center.y)
        .pre_concat(Transform::from_rotate(layout.rotation_deg))
}

/// Stroke the guide described by `overlay` onto `pixmap`.
///
/// Returns the number of strokes drawn.
pub fn draw_guide(
    pixmap: &mut Pixmap,
    layout: &GuideLayout,
    overlay: &OverlayConfig,
    pixel_scale: f32,
) -> usize {
    let primitives = geometry::guide_primitives(overlay.kind, layout.side);
    let transform = guide_transform(layout, pixel_scale);
    let stroke = Stroke {
        width: guide::STROKE_WIDTH,
        line_cap: LineCap::Butt,
        ..Default::default()
    };

    let mut drawn = 0;
    for primitive in &primitives {
        let Some(path) = build_primitive_path(primitive) else {
            continue;
        };
        let [r, g, b, a] = overlay.color.to_rgba_u8(primitive_opacity(primitive));
        let mut paint = Paint::default();
        paint.set_color_rgba8(r, g, b, a);
        paint.anti_alias = true;

        pixmap.stroke_path(&path, &paint, &stroke, transform, None);
        drawn += 1;
    }
    log::debug!(
        "drew {} guide with {} strokes (side {})",
        overlay.kind,
        drawn,
        layout.side
    );
    drawn
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{HexColor, OverlayKind, Size};
    use crate::render::geometry::guide_layout;

    fn pixel(pixmap: &Pixmap, x: u32, y: u32) -> [u8; 4] {
        let c = pixmap.pixel(x, y).unwrap().demultiply();
        [c.red(), c.green(), c.blue(), c.alpha()]
    }

    #[test]
    fn test_indices_draw_crosshair_through_center() {
        let overlay = OverlayConfig::new(OverlayKind::Indices, HexColor::rgb(0, 255, 0));
        let size = Size::new(200.0, 100.0);
        let mut pixmap = Pixmap::new(200, 100).unwrap();
        let layout = guide_layout(size, None, &overlay);

        let drawn = draw_guide(&mut pixmap, &layout, &overlay, 1.0);
        assert_eq!(drawn, 8);

        // Horizontal line at y=50 spans the 100px guide box centered at x=100
        let on_line = pixel(&pixmap, 60, 50);
        assert!(on_line[3] > 0);
        assert!(on_line[1] > 200);
        assert_eq!(on_line[0], 0);
        // Outside the square guide box nothing is drawn
        assert_eq!(pixel(&pixmap, 10, 50)[3], 0);
    }

    #[test]
    fn test_grid_draws_every_kind_in_overlay_color() {
        let overlay = OverlayConfig::new(OverlayKind::Grid, HexColor::rgb(255, 0, 0));
        let size = Size::new(100.0, 100.0);
        let mut pixmap = Pixmap::new(100, 100).unwrap();
        let layout = guide_layout(size, None, &overlay);
        assert!(draw_guide(&mut pixmap, &layout, &overlay, 1.0) > 0);

        let painted: Vec<_> = pixmap
            .pixels()
            .iter()
            .map(|p| p.demultiply())
            .filter(|c| c.alpha() > 0)
            .collect();
        assert!(!painted.is_empty());
        assert!(painted.iter().all(|c| c.green() == 0 && c.blue() == 0));
    }

    #[test]
    fn test_pixel_scale_multiplies_guide() {
        let overlay = OverlayConfig::new(OverlayKind::Indices, HexColor::rgb(0, 0, 255));
        let size = Size::new(50.0, 50.0);
        let layout = guide_layout(size, None, &overlay);
        let mut pixmap = Pixmap::new(150, 150).unwrap();
        draw_guide(&mut pixmap, &layout, &overlay, 3.0);
        // Vertical crosshair at x=75 in output pixels
        assert!(pixel(&pixmap, 75, 20)[3] > 0);
    }
}
