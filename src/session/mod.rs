//! Canvas session management module
//!
//! This module contains:
//! - Session state and its message handler
//! - Message types and tickets for async completions
//! - Jobs the host runs on the session's behalf

pub mod jobs;
pub mod messages;
pub mod state;

pub use jobs::{Job, Services};
pub use messages::{ControlMsg, Msg, OverlayMsg};
pub use state::{Notice, Session, SessionSettings};
