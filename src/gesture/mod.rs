//! Pointer, touch and wheel handling
//!
//! Device backends convert their native events into [`InputEvent`] and hand them
//! to [`GestureController::dispatch`]; the transform math never sees the device.

pub mod controller;
pub mod events;

pub use controller::{
    GestureConfig, GestureController, GestureOutcome, GestureSession, PINCH_SENSITIVITY,
    WHEEL_STEP,
};
pub use events::InputEvent;
