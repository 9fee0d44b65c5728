//! Image layer rendering using tiny-skia
//!
//! The loaded photo is fitted inside the viewport (contain), centered, and then
//! translated, scaled and rotated about the viewport center, the same order a
//! `translate() scale() rotate()` CSS transform would apply.

use image::RgbaImage;
use tiny_skia::{FilterQuality, IntSize, Pixmap, PixmapPaint, PremultipliedColorU8, Transform};

use super::geometry;
use crate::domain::{ImageTransform, Size};

/// Convert a straight-alpha RgbaImage to a premultiplied Pixmap
pub fn pixmap_from_rgba(img: &RgbaImage) -> Option<Pixmap> {
    let size = IntSize::from_wh(img.width(), img.height())?;
    let mut data = img.as_raw().clone();
    for px in data.chunks_exact_mut(4) {
        let a = px[3] as u16;
        if a == 255 {
            continue;
        }
        for c in &mut px[..3] {
            *c = ((*c as u16 * a + 127) / 255) as u8;
        }
    }
    Pixmap::from_vec(data, size)
}

/// Convert a premultiplied Pixmap back to a straight-alpha RgbaImage
pub fn rgba_from_pixmap(pixmap: &Pixmap) -> RgbaImage {
    let data: Vec<u8> = pixmap
        .pixels()
        .iter()
        .flat_map(|p: &PremultipliedColorU8| {
            let c = p.demultiply();
            [c.red(), c.green(), c.blue(), c.alpha()]
        })
        .collect();
    // Length always matches width * height * 4
    RgbaImage::from_raw(pixmap.width(), pixmap.height(), data)
        .unwrap_or_else(|| RgbaImage::new(pixmap.width(), pixmap.height()))
}

/// Convert RgbaImage to Pixmap, apply drawing function, and copy back
pub fn with_pixmap(img: &mut RgbaImage, f: impl FnOnce(&mut Pixmap)) {
    let Some(mut pixmap) = pixmap_from_rgba(img) else {
        return;
    };

    f(&mut pixmap);

    *img = rgba_from_pixmap(&pixmap);
}

/// Transform from image pixels to output pixels
pub fn image_layer_transform(
    image_width: u32,
    image_height: u32,
    viewport: Size,
    transform: &ImageTransform,
    pixel_scale: f32,
) -> Option<Transform> {
    let (fit, fitted) = geometry::fit_contain(image_width, image_height, viewport)?;
    let center = viewport.center() + transform.translate();
    let ts = Transform::from_scale(pixel_scale, pixel_scale)
        .pre_translate(center.x, center.y)
        .pre_scale(transform.scale(), transform.scale())
        .pre_concat(Transform::from_rotate(transform.rotation_deg()))
        .pre_translate(-fitted.width * 0.5, -fitted.height * 0.5)
        .pre_scale(fit, fit);
    ts.is_finite().then_some(ts)
}

/// Draw the transformed image onto `target`. Returns false if nothing could be drawn.
pub fn draw_image_layer(
    target: &mut Pixmap,
    image: &Pixmap,
    viewport: Size,
    transform: &ImageTransform,
    pixel_scale: f32,
) -> bool {
    let Some(ts) =
        image_layer_transform(image.width(), image.height(), viewport, transform, pixel_scale)
    else {
        return false;
    };
    let paint = PixmapPaint {
        quality: FilterQuality::Bilinear,
        ..Default::default()
    };
    target.draw_pixmap(0, 0, image.as_ref(), &paint, ts, None);
    true
}
