//! Message types for a canvas session
//!
//! This module contains:
//! - Msg enum with nested sub-enums for discrete controls and overlay tools
//! - Tickets that tie an async completion back to the request that started it

use crate::analysis::{AnalysisMode, AnalysisReport};
use crate::capture::{ImageSource, SourceImage};
use crate::domain::{HexColor, OverlayKind, Point, Size};
use crate::error::Result;
use crate::export::ExportArtifact;
use crate::gesture::InputEvent;

// ============================================================================
// Tickets
// ============================================================================

/// Identity of a loaded image; a fresh one is issued on every successful load
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ImageId(pub(crate) u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadTicket(pub(crate) u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExportTicket(pub(crate) u64);

/// Captures which image an analysis was requested for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnalysisTicket {
    pub(crate) seq: u64,
    pub(crate) image: ImageId,
}

impl AnalysisTicket {
    pub fn image(&self) -> ImageId {
        self.image
    }
}

// ============================================================================
// Discrete controls
// ============================================================================

/// Image transform controls outside of gestures
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ControlMsg {
    /// Identity transform and overlay geometry; kind and color stay
    Reset,
    /// Add degrees to the rotation (rounded to 2 decimals)
    RotateBy(f32),
    /// Set rotation in degrees (rounded to 2 decimals)
    SetRotation(f32),
    /// Zoom in by one wheel step
    ZoomIn,
    /// Zoom out by one wheel step
    ZoomOut,
    /// Set scale directly, clamped
    SetScale(f32),
    /// Set pan offset directly
    SetTranslate(Point),
}

/// Overlay tool selections
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OverlayMsg {
    SetKind(OverlayKind),
    /// Switch to the other overlay kind
    CycleKind,
    SetColor(HexColor),
    SetRotation(f32),
    SetScalePercent(f32),
    SetOffset(f32, f32),
    /// Reset overlay geometry only
    ResetGeometry,
}

// ============================================================================
// Main Message Enum
// ============================================================================

/// Messages for canvas session interactions
#[derive(Debug)]
pub enum Msg {
    /// Raw pointer/touch/wheel input
    Input(InputEvent),
    /// Discrete transform controls
    Control(ControlMsg),
    /// Overlay tool selections
    Overlay(OverlayMsg),
    /// The interaction surface changed size
    Resize(Size),
    /// Start loading a new photo
    LoadImage(ImageSource),
    /// Photo load finished
    ImageLoaded(LoadTicket, Result<SourceImage>),
    /// Start an export of the composed view
    Export,
    /// Export finished
    ExportFinished(ExportTicket, Result<ExportArtifact>),
    /// Send the current photo to the analysis delegate
    Analyze(AnalysisMode),
    /// Analysis finished
    AnalysisFinished(AnalysisTicket, Result<AnalysisReport>),
    /// Clear the last error message
    DismissNotice,
}

// ============================================================================
// Convenience Constructors
// ============================================================================

impl Msg {
    pub fn reset() -> Self {
        Self::Control(ControlMsg::Reset)
    }
    pub fn rotate_by(delta_deg: f32) -> Self {
        Self::Control(ControlMsg::RotateBy(delta_deg))
    }
    pub fn zoom_in() -> Self {
        Self::Control(ControlMsg::ZoomIn)
    }
    pub fn zoom_out() -> Self {
        Self::Control(ControlMsg::ZoomOut)
    }
    pub fn overlay_kind(kind: OverlayKind) -> Self {
        Self::Overlay(OverlayMsg::SetKind(kind))
    }
    pub fn overlay_color(color: HexColor) -> Self {
        Self::Overlay(OverlayMsg::SetColor(color))
    }
}

impl From<InputEvent> for Msg {
    fn from(event: InputEvent) -> Self {
        Msg::Input(event)
    }
}
