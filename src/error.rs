//! Error taxonomy for the canvas core
//!
//! Every error here is recoverable: the caller reports it and the operator retries
//! the action that produced it. None of them touch transform or overlay state.

use thiserror::Error;

/// Broad grouping used by a UI to pick how a message is shown
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Image source failed to load or decode, or a value was rejected at the boundary
    Input,
    /// Export rasterization, encoding or delivery failed
    Capture,
    /// The analysis delegate rejected or returned something unusable
    Delegate,
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("could not load image: {0}")]
    Input(String),

    #[error("unknown overlay kind '{0}' (expected 'indices' or 'grid')")]
    UnknownOverlayKind(String),

    #[error("invalid color '{0}' (expected #rrggbb)")]
    InvalidColor(String),

    #[error("capture failed: {0}")]
    Capture(String),

    #[error("could not encode image: {0}")]
    Encode(String),

    #[error("could not save file: {0}")]
    Delivery(#[from] std::io::Error),

    #[error("analysis failed: {0}")]
    Delegate(String),
}

impl Error {
    pub fn category(&self) -> ErrorCategory {
        match self {
            Error::Input(_) | Error::UnknownOverlayKind(_) | Error::InvalidColor(_) => {
                ErrorCategory::Input
            }
            Error::Capture(_) | Error::Encode(_) | Error::Delivery(_) => ErrorCategory::Capture,
            Error::Delegate(_) => ErrorCategory::Delegate,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
