//! Export watermark drawn with an 8x8 bitmap font
//!
//! Each lit glyph bit becomes a square cell; the whole string is filled as one
//! path so the semi-transparent text does not double up where cells touch.

use font8x8::{BASIC_FONTS, UnicodeFonts};
use image::RgbaImage;
use tiny_skia::{FillRule, Paint, PathBuilder, Pixmap, Rect, Transform};

use super::geometry::{self, watermark};
use super::image::with_pixmap;
use crate::domain::Point;

/// Build the filled cells for `text` with its top-left corner at `origin`
fn build_text_path(text: &str, origin: Point, font_px: f32) -> Option<tiny_skia::Path> {
    let cell = font_px / watermark::GLYPH_CELLS as f32;
    let mut pb = PathBuilder::new();
    let mut cursor_x = origin.x;

    for ch in text.chars() {
        let glyph = BASIC_FONTS.get(ch).or_else(|| BASIC_FONTS.get('?'));
        if let Some(glyph) = glyph {
            for (row_idx, row) in glyph.iter().enumerate() {
                for col_idx in 0..watermark::GLYPH_CELLS {
                    if (*row >> col_idx) & 1 == 0 {
                        continue;
                    }
                    let x = cursor_x + col_idx as f32 * cell;
                    let y = origin.y + row_idx as f32 * cell;
                    if let Some(rect) = Rect::from_xywh(x, y, cell, cell) {
                        pb.push_rect(rect);
                    }
                }
            }
        }
        cursor_x += font_px;
    }

    pb.finish()
}

/// Draw `text` anchored to the bottom-right corner of `pixmap`
pub fn draw_watermark(pixmap: &mut Pixmap, text: &str) {
    let text = text.trim();
    if text.is_empty() {
        return;
    }
    let font_px = geometry::watermark_font_px(pixmap.width());
    let origin = geometry::watermark_origin(
        pixmap.width(),
        pixmap.height(),
        text.chars().count(),
        font_px,
    );
    let Some(path) = build_text_path(text, origin, font_px) else {
        return;
    };

    let mut paint = Paint::default();
    paint.set_color_rgba8(255, 255, 255, (watermark::OPACITY * 255.0).round() as u8);
    paint.anti_alias = false;
    pixmap.fill_path(&path, &paint, FillRule::Winding, Transform::identity(), None);
}

/// Draw the watermark onto an image
pub fn draw_watermark_on_image(img: &mut RgbaImage, text: &str) {
    with_pixmap(img, |pixmap| draw_watermark(pixmap, text));
}
