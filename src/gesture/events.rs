//! Input events delivered to the gesture controller
//!
//! Mouse and touch backends both translate into this closed set. Each pointer
//! event carries the contacts that are active *after* the event: a mouse press is
//! one contact, a mouse release is none, a touch event lists the remaining touches.

use serde::{Deserialize, Serialize};

use crate::domain::Point;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InputEvent {
    /// A contact went down
    Press { contacts: Vec<Point> },
    /// One or more contacts moved
    Move { contacts: Vec<Point> },
    /// A contact lifted; `contacts` are the ones still down
    Release { contacts: Vec<Point> },
    /// Touch cancel or the pointer left the surface
    Cancel,
    /// Scroll wheel tick; negative `delta_y` scrolls up
    Wheel { delta_y: f32 },
}

impl InputEvent {
    pub fn mouse_down(x: f32, y: f32) -> Self {
        InputEvent::Press {
            contacts: vec![Point::new(x, y)],
        }
    }

    pub fn mouse_move(x: f32, y: f32) -> Self {
        InputEvent::Move {
            contacts: vec![Point::new(x, y)],
        }
    }

    pub fn mouse_up() -> Self {
        InputEvent::Release {
            contacts: Vec::new(),
        }
    }

    /// Number of active contacts after this event, if it is a pointer event
    pub fn contact_count(&self) -> Option<usize> {
        match self {
            InputEvent::Press { contacts }
            | InputEvent::Move { contacts }
            | InputEvent::Release { contacts } => Some(contacts.len()),
            InputEvent::Cancel | InputEvent::Wheel { .. } => None,
        }
    }
}

/// Load a recorded gesture script (a JSON array of events)
pub fn parse_script(json: &str) -> serde_json::Result<Vec<InputEvent>> {
    serde_json::from_str(json)
}
