//! Pan/zoom/rotation state for the displayed image

use serde::Serialize;

use super::geometry::Point;

/// Smallest allowed zoom factor
pub const MIN_SCALE: f32 = 0.1;
/// Largest allowed zoom factor
pub const MAX_SCALE: f32 = 10.0;

/// Rotations past this magnitude are wrapped to within one turn
pub const ROTATION_WRAP_DEG: f32 = 36_000.0;

/// Round to 1/100 of a unit
#[inline]
pub fn round2(value: f32) -> f32 {
    (value * 100.0).round() / 100.0
}

/// Rounded rotation, or None when it cannot be stored as a finite value
fn normalize_rotation(deg: f32) -> Option<f32> {
    if !deg.is_finite() {
        return None;
    }
    let deg = if deg.abs() > ROTATION_WRAP_DEG { deg % 360.0 } else { deg };
    let rounded = round2(deg);
    rounded.is_finite().then_some(rounded)
}

/// Transform applied to the image layer, in interaction-surface pixels.
///
/// All mutation goes through the setters so the scale clamp lives in one place.
/// Out-of-range input is clamped rather than rejected: it comes from continuous
/// physical gestures.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct ImageTransform {
    rotation_deg: f32,
    scale: f32,
    translate_x: f32,
    translate_y: f32,
}

impl Default for ImageTransform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl ImageTransform {
    pub const IDENTITY: ImageTransform = ImageTransform {
        rotation_deg: 0.0,
        scale: 1.0,
        translate_x: 0.0,
        translate_y: 0.0,
    };

    pub fn rotation_deg(&self) -> f32 {
        self.rotation_deg
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }

    pub fn translate(&self) -> Point {
        Point::new(self.translate_x, self.translate_y)
    }

    /// Back to identity; the scale still passes through the clamp
    pub fn reset(&mut self) {
        *self = Self::IDENTITY;
        self.set_scale(1.0);
    }

    /// Store an absolute rotation rounded to 2 decimals
    pub fn set_rotation(&mut self, deg: f32) {
        if let Some(deg) = normalize_rotation(deg) {
            self.rotation_deg = deg;
        }
    }

    /// Add to the current rotation and round to 2 decimals
    pub fn adjust_rotation(&mut self, delta_deg: f32) {
        if !delta_deg.is_finite() {
            return;
        }
        if let Some(deg) = normalize_rotation(self.rotation_deg + delta_deg) {
            self.rotation_deg = deg;
        }
    }

    /// Set the zoom factor, clamped to [`MIN_SCALE`], [`MAX_SCALE`]
    pub fn set_scale(&mut self, scale: f32) {
        if scale.is_nan() {
            return;
        }
        self.scale = scale.clamp(MIN_SCALE, MAX_SCALE);
    }

    /// Add to the zoom factor, clamped
    pub fn zoom_by(&mut self, delta: f32) {
        self.set_scale(self.scale + delta);
    }

    pub fn set_translate(&mut self, translate: Point) {
        if translate.x.is_finite() && translate.y.is_finite() {
            self.translate_x = translate.x;
            self.translate_y = translate.y;
        }
    }

    pub fn is_identity(&self) -> bool {
        *self == Self::IDENTITY
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reset_is_idempotent() {
        let mut t = ImageTransform::default();
        t.set_rotation(12.5);
        t.set_scale(4.0);
        t.set_translate(Point::new(30.0, -12.0));

        t.reset();
        let once = t;
        t.reset();
        assert_eq!(t, once);
        assert_eq!(t.rotation_deg(), 0.0);
        assert_eq!(t.scale(), 1.0);
        assert_eq!(t.translate(), Point::ORIGIN);
    }

    #[test]
    fn test_adjust_rotation_does_not_accumulate_error() {
        let mut t = ImageTransform::default();
        for _ in 0..10 {
            t.adjust_rotation(0.1);
        }
        assert_eq!(t.rotation_deg(), 1.0);

        for _ in 0..5 {
            t.adjust_rotation(0.0);
        }
        assert_eq!(t.rotation_deg(), 1.0);
    }

    #[test]
    fn test_set_rotation_rounds() {
        let mut t = ImageTransform::default();
        t.set_rotation(33.33333);
        assert_eq!(t.rotation_deg(), 33.33);
        t.set_rotation(-720.456);
        assert_eq!(t.rotation_deg(), -720.46);
    }

    #[test]
    fn test_huge_rotation_stays_finite() {
        let mut t = ImageTransform::default();
        t.set_rotation(1e37);
        assert!(t.rotation_deg().is_finite());
        assert!(t.rotation_deg().abs() < 360.0);
        assert_eq!(t.rotation_deg(), round2(t.rotation_deg()));

        t.adjust_rotation(1.0);
        assert!(t.rotation_deg().is_finite());

        t.set_rotation(-3.0e38);
        t.adjust_rotation(3.0e38);
        assert!(t.rotation_deg().is_finite());
        assert!(t.rotation_deg().abs() < ROTATION_WRAP_DEG);
    }

    #[test]
    fn test_scale_clamped() {
        let mut t = ImageTransform::default();
        t.set_scale(50.0);
        assert_eq!(t.scale(), MAX_SCALE);
        t.set_scale(-3.0);
        assert_eq!(t.scale(), MIN_SCALE);
        t.set_scale(f32::NAN);
        assert_eq!(t.scale(), MIN_SCALE);
        t.set_scale(f32::INFINITY);
        assert_eq!(t.scale(), MAX_SCALE);
    }

    #[test]
    fn test_non_finite_input_ignored() {
        let mut t = ImageTransform::default();
        t.adjust_rotation(f32::NAN);
        t.set_translate(Point::new(f32::INFINITY, 1.0));
        assert!(t.is_identity());
    }
}
