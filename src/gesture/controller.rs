//! Gesture controller: turns input events into transform updates
//!
//! One contact pans, two contacts pinch-zoom, the wheel zooms in fixed steps.
//! The controller remembers how many contacts were active on the previous event
//! so that going from a pinch back to a single finger re-anchors the pan at the
//! current transform instead of jumping by whatever moved during the pinch.

use crate::domain::{ImageTransform, Point};

use super::events::InputEvent;

/// Scale change per wheel tick
pub const WHEEL_STEP: f32 = 0.1;
/// Scale change per pixel of pinch distance change
pub const PINCH_SENSITIVITY: f32 = 0.005;

/// Tunable gesture constants
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GestureConfig {
    pub wheel_step: f32,
    pub pinch_sensitivity: f32,
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            wheel_step: WHEEL_STEP,
            pinch_sensitivity: PINCH_SENSITIVITY,
        }
    }
}

/// Ephemeral state for one continuous gesture
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct GestureSession {
    pub is_dragging: bool,
    /// Pointer position minus translate at the moment the pan was anchored
    pub drag_anchor: Point,
    pub last_pinch_distance: Option<f32>,
    pub last_touch_point: Option<Point>,
    /// Contacts active after the previous event
    active_contacts: usize,
}

impl GestureSession {
    pub fn active_contacts(&self) -> usize {
        self.active_contacts
    }

    pub fn is_idle(&self) -> bool {
        *self == Self::default()
    }
}

/// What a dispatched event did to the transform
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GestureOutcome {
    /// Nothing happened (hover, malformed event)
    Ignored,
    /// Gesture state was (re)anchored; the transform did not change
    Anchored,
    Panned,
    Zoomed,
    /// Gesture state was cleared
    Ended,
}

impl GestureOutcome {
    /// Whether the image layer needs a redraw
    pub fn transform_changed(self) -> bool {
        matches!(self, GestureOutcome::Panned | GestureOutcome::Zoomed)
    }
}

#[derive(Debug, Clone, Default)]
pub struct GestureController {
    config: GestureConfig,
    session: GestureSession,
}

impl GestureController {
    pub fn new(config: GestureConfig) -> Self {
        Self {
            config,
            session: GestureSession::default(),
        }
    }

    pub fn config(&self) -> GestureConfig {
        self.config
    }

    pub fn session(&self) -> &GestureSession {
        &self.session
    }

    /// Drop any in-progress gesture
    pub fn clear(&mut self) {
        self.session = GestureSession::default();
    }

    /// Apply one input event to `transform`
    pub fn dispatch(&mut self, event: &InputEvent, transform: &mut ImageTransform) -> GestureOutcome {
        match event {
            InputEvent::Press { contacts } => self.press(contacts, transform),
            InputEvent::Move { contacts } => self.motion(contacts, transform),
            InputEvent::Release { contacts } => self.release(contacts, transform),
            InputEvent::Cancel => self.end(),
            InputEvent::Wheel { delta_y } => self.wheel(*delta_y, transform),
        }
    }

    fn press(&mut self, contacts: &[Point], transform: &ImageTransform) -> GestureOutcome {
        match contacts {
            [] => GestureOutcome::Ignored,
            [point] => self.anchor_pan(*point, transform),
            [first, second, ..] => self.anchor_pinch(*first, *second, contacts.len()),
        }
    }

    fn motion(&mut self, contacts: &[Point], transform: &mut ImageTransform) -> GestureOutcome {
        match contacts {
            [] => GestureOutcome::Ignored,
            [point] => {
                if self.session.active_contacts >= 2 {
                    // A finger lifted without a release event reaching us
                    return self.anchor_pan(*point, transform);
                }
                if !self.session.is_dragging {
                    return GestureOutcome::Ignored;
                }
                transform.set_translate(*point - self.session.drag_anchor);
                self.session.last_touch_point = Some(*point);
                GestureOutcome::Panned
            }
            [first, second, ..] => {
                let Some(last) = self.session.last_pinch_distance else {
                    return self.anchor_pinch(*first, *second, contacts.len());
                };
                let distance = first.distance(*second);
                transform.zoom_by((distance - last) * self.config.pinch_sensitivity);
                self.session.last_pinch_distance = Some(distance);
                self.session.active_contacts = contacts.len();
                GestureOutcome::Zoomed
            }
        }
    }

    fn release(&mut self, contacts: &[Point], transform: &ImageTransform) -> GestureOutcome {
        match contacts {
            [] => self.end(),
            [point] => self.anchor_pan(*point, transform),
            [first, second, ..] => self.anchor_pinch(*first, *second, contacts.len()),
        }
    }

    fn wheel(&mut self, delta_y: f32, transform: &mut ImageTransform) -> GestureOutcome {
        if delta_y == 0.0 || delta_y.is_nan() {
            return GestureOutcome::Ignored;
        }
        // Scrolling up (negative delta) zooms in
        let step = if delta_y < 0.0 {
            self.config.wheel_step
        } else {
            -self.config.wheel_step
        };
        transform.zoom_by(step);
        GestureOutcome::Zoomed
    }

    fn anchor_pan(&mut self, point: Point, transform: &ImageTransform) -> GestureOutcome {
        log::debug!(
            "pan anchored at ({}, {}) from {} contact(s)",
            point.x,
            point.y,
            self.session.active_contacts
        );
        self.session = GestureSession {
            is_dragging: true,
            drag_anchor: point - transform.translate(),
            last_pinch_distance: None,
            last_touch_point: Some(point),
            active_contacts: 1,
        };
        GestureOutcome::Anchored
    }

    fn anchor_pinch(&mut self, first: Point, second: Point, count: usize) -> GestureOutcome {
        let distance = first.distance(second);
        log::debug!("pinch anchored at distance {distance}");
        // The pan anchor stays stale until a single contact re-anchors it
        self.session.last_pinch_distance = Some(distance);
        self.session.last_touch_point = None;
        self.session.active_contacts = count;
        GestureOutcome::Anchored
    }

    fn end(&mut self) -> GestureOutcome {
        self.clear();
        GestureOutcome::Ended
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{MAX_SCALE, MIN_SCALE};

    fn touches(points: &[(f32, f32)]) -> Vec<Point> {
        points.iter().map(|&(x, y)| Point::new(x, y)).collect()
    }

    fn moved(points: &[(f32, f32)]) -> InputEvent {
        InputEvent::Move {
            contacts: touches(points),
        }
    }

    #[test]
    fn test_pan_follows_pointer_exactly() {
        let mut ctl = GestureController::default();
        let mut t = ImageTransform::default();

        ctl.dispatch(&InputEvent::mouse_down(200.0, 150.0), &mut t);
        for step in 1..=7 {
            ctl.dispatch(
                &InputEvent::mouse_move(200.0 + step as f32 * 3.0, 150.0 - step as f32),
                &mut t,
            );
        }
        ctl.dispatch(&InputEvent::mouse_move(237.0, 110.0), &mut t);
        assert_eq!(t.translate(), Point::new(37.0, -40.0));

        // Same result with a single move event
        let mut ctl = GestureController::default();
        let mut t2 = ImageTransform::default();
        ctl.dispatch(&InputEvent::mouse_down(200.0, 150.0), &mut t2);
        ctl.dispatch(&InputEvent::mouse_move(237.0, 110.0), &mut t2);
        assert_eq!(t2.translate(), t.translate());
    }

    #[test]
    fn test_pan_keeps_existing_offset() {
        let mut ctl = GestureController::default();
        let mut t = ImageTransform::default();
        t.set_translate(Point::new(50.0, 50.0));

        ctl.dispatch(&InputEvent::mouse_down(10.0, 10.0), &mut t);
        ctl.dispatch(&InputEvent::mouse_move(20.0, 5.0), &mut t);
        assert_eq!(t.translate(), Point::new(60.0, 45.0));
    }

    #[test]
    fn test_hover_without_press_is_ignored() {
        let mut ctl = GestureController::default();
        let mut t = ImageTransform::default();
        let outcome = ctl.dispatch(&InputEvent::mouse_move(40.0, 40.0), &mut t);
        assert_eq!(outcome, GestureOutcome::Ignored);
        assert!(t.is_identity());
    }

    #[test]
    fn test_move_with_no_contacts_is_noop() {
        let mut ctl = GestureController::default();
        let mut t = ImageTransform::default();
        ctl.dispatch(&InputEvent::mouse_down(1.0, 1.0), &mut t);
        let before = *ctl.session();
        let outcome = ctl.dispatch(&moved(&[]), &mut t);
        assert_eq!(outcome, GestureOutcome::Ignored);
        assert_eq!(*ctl.session(), before);
        assert!(t.is_identity());
    }

    #[test]
    fn test_wheel_direction_and_clamp() {
        let mut ctl = GestureController::default();
        let mut t = ImageTransform::default();

        ctl.dispatch(&InputEvent::Wheel { delta_y: -100.0 }, &mut t);
        assert!((t.scale() - 1.1).abs() < 1e-6);
        ctl.dispatch(&InputEvent::Wheel { delta_y: 3.0 }, &mut t);
        assert!((t.scale() - 1.0).abs() < 1e-6);

        for _ in 0..200 {
            ctl.dispatch(&InputEvent::Wheel { delta_y: 1.0 }, &mut t);
            assert!(t.scale() >= MIN_SCALE);
        }
        assert_eq!(t.scale(), MIN_SCALE);

        for _ in 0..200 {
            ctl.dispatch(&InputEvent::Wheel { delta_y: -1.0 }, &mut t);
            assert!(t.scale() <= MAX_SCALE);
        }
        assert_eq!(t.scale(), MAX_SCALE);

        assert_eq!(
            ctl.dispatch(&InputEvent::Wheel { delta_y: 0.0 }, &mut t),
            GestureOutcome::Ignored
        );
    }

    #[test]
    fn test_pinch_is_incremental() {
        let mut ctl = GestureController::default();
        let mut t = ImageTransform::default();

        ctl.dispatch(
            &InputEvent::Press {
                contacts: touches(&[(100.0, 100.0), (200.0, 100.0)]),
            },
            &mut t,
        );
        assert_eq!(ctl.session().last_pinch_distance, Some(100.0));
        assert_eq!(t.scale(), 1.0);

        // +40px -> +0.2
        ctl.dispatch(&moved(&[(80.0, 100.0), (220.0, 100.0)]), &mut t);
        assert!((t.scale() - 1.2).abs() < 1e-5);
        assert_eq!(ctl.session().last_pinch_distance, Some(140.0));

        // -20px -> -0.1
        ctl.dispatch(&moved(&[(90.0, 100.0), (210.0, 100.0)]), &mut t);
        assert!((t.scale() - 1.1).abs() < 1e-5);
    }

    #[test]
    fn test_pinch_records_reference_on_first_two_touch_move() {
        let mut ctl = GestureController::default();
        let mut t = ImageTransform::default();
        ctl.dispatch(&InputEvent::Press { contacts: touches(&[(0.0, 0.0)]) }, &mut t);

        let outcome = ctl.dispatch(&moved(&[(0.0, 0.0), (0.0, 300.0)]), &mut t);
        assert_eq!(outcome, GestureOutcome::Anchored);
        assert_eq!(t.scale(), 1.0);
        assert_eq!(ctl.session().last_pinch_distance, Some(300.0));
    }

    #[test]
    fn test_pinch_scale_stays_clamped() {
        let mut ctl = GestureController::default();
        let mut t = ImageTransform::default();
        ctl.dispatch(&moved(&[(0.0, 0.0), (10.0, 0.0)]), &mut t);
        ctl.dispatch(&moved(&[(0.0, 0.0), (5000.0, 0.0)]), &mut t);
        assert_eq!(t.scale(), MAX_SCALE);
        ctl.dispatch(&moved(&[(0.0, 0.0), (1.0, 0.0)]), &mut t);
        assert_eq!(t.scale(), MIN_SCALE);
    }

    #[test]
    fn test_pan_resumes_without_jump_after_pinch() {
        let mut ctl = GestureController::default();
        let mut t = ImageTransform::default();

        // Single finger pans for three frames
        ctl.dispatch(&InputEvent::Press { contacts: touches(&[(100.0, 100.0)]) }, &mut t);
        ctl.dispatch(&moved(&[(110.0, 100.0)]), &mut t);
        ctl.dispatch(&moved(&[(120.0, 105.0)]), &mut t);
        assert_eq!(t.translate(), Point::new(20.0, 5.0));

        // Second finger lands, pinch for two frames while the first finger drifts
        ctl.dispatch(
            &InputEvent::Press {
                contacts: touches(&[(120.0, 105.0), (220.0, 105.0)]),
            },
            &mut t,
        );
        ctl.dispatch(&moved(&[(150.0, 130.0), (260.0, 105.0)]), &mut t);
        ctl.dispatch(&moved(&[(170.0, 160.0), (300.0, 105.0)]), &mut t);
        // The stale pan anchor was not used while two fingers were down
        assert_eq!(t.translate(), Point::new(20.0, 5.0));
        let scale_after_pinch = t.scale();
        assert!(scale_after_pinch > 1.0);

        // Second finger lifts; the remaining finger re-anchors
        let outcome = ctl.dispatch(
            &InputEvent::Release {
                contacts: touches(&[(170.0, 160.0)]),
            },
            &mut t,
        );
        assert_eq!(outcome, GestureOutcome::Anchored);
        assert_eq!(t.translate(), Point::new(20.0, 5.0));
        assert_eq!(ctl.session().last_pinch_distance, None);

        // Subsequent frames move by exactly the finger delta
        ctl.dispatch(&moved(&[(175.0, 158.0)]), &mut t);
        assert_eq!(t.translate(), Point::new(25.0, 3.0));
        assert_eq!(t.scale(), scale_after_pinch);
    }

    #[test]
    fn test_pan_reanchors_when_lift_arrives_as_move() {
        let mut ctl = GestureController::default();
        let mut t = ImageTransform::default();
        t.set_translate(Point::new(-4.0, 9.0));

        ctl.dispatch(&moved(&[(0.0, 0.0), (100.0, 0.0)]), &mut t);
        ctl.dispatch(&moved(&[(0.0, 0.0), (120.0, 0.0)]), &mut t);

        let outcome = ctl.dispatch(&moved(&[(60.0, 60.0)]), &mut t);
        assert_eq!(outcome, GestureOutcome::Anchored);
        assert_eq!(t.translate(), Point::new(-4.0, 9.0));

        ctl.dispatch(&moved(&[(61.0, 62.0)]), &mut t);
        assert_eq!(t.translate(), Point::new(-3.0, 11.0));
    }

    #[test]
    fn test_end_and_cancel_clear_everything() {
        let mut ctl = GestureController::default();
        let mut t = ImageTransform::default();

        ctl.dispatch(&moved(&[(0.0, 0.0), (100.0, 0.0)]), &mut t);
        ctl.dispatch(&InputEvent::Release { contacts: vec![] }, &mut t);
        assert!(ctl.session().is_idle());

        ctl.dispatch(&InputEvent::mouse_down(5.0, 5.0), &mut t);
        assert!(ctl.session().is_dragging);
        assert_eq!(ctl.dispatch(&InputEvent::Cancel, &mut t), GestureOutcome::Ended);
        assert!(ctl.session().is_idle());

        // Moves after cancel do nothing
        ctl.dispatch(&InputEvent::mouse_move(50.0, 50.0), &mut t);
        assert!(t.is_identity());
    }

    #[test]
    fn test_custom_constants() {
        let mut ctl = GestureController::new(GestureConfig {
            wheel_step: 0.5,
            pinch_sensitivity: 0.01,
        });
        let mut t = ImageTransform::default();
        ctl.dispatch(&InputEvent::Wheel { delta_y: -1.0 }, &mut t);
        assert!((t.scale() - 1.5).abs() < 1e-6);
    }
}
