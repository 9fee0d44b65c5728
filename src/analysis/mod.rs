//! AI analysis delegate boundary
//!
//! The core hands the displayed photo's bytes to an external service and gets a
//! structured verdict back. It never interprets the verdict beyond display.

pub mod bands;
pub mod delegate;

use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};
use serde::{Deserialize, Serialize};

use crate::capture::SourceImage;
use crate::error::{Error, Result};

pub use bands::Band;
pub use delegate::{AnalysisDelegate, CommandDelegate};

/// What kind of photo is being analyzed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnalysisMode {
    /// Dial/hand alignment against the reference guide
    #[default]
    Alignment,
    /// Timegrapher readout
    Timegrapher,
}

impl std::str::FromStr for AnalysisMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "alignment" | "qc" => Ok(AnalysisMode::Alignment),
            "timegrapher" => Ok(AnalysisMode::Timegrapher),
            other => Err(format!("unknown analysis mode '{other}'")),
        }
    }
}

/// Payload sent to the delegate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisRequest {
    pub mode: AnalysisMode,
    pub mime_type: String,
    /// Base64 of the photo's bytes as loaded
    pub data: String,
}

impl AnalysisRequest {
    pub fn from_image(mode: AnalysisMode, image: &SourceImage) -> Self {
        Self {
            mode,
            mime_type: image.mime_type().to_string(),
            data: BASE64.encode(image.encoded.as_slice()),
        }
    }
}

/// Overall alignment grade
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Grade {
    Excellent,
    Acceptable,
    Reject,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlignmentVerdict {
    #[serde(alias = "status")]
    pub grade: Grade,
    #[serde(default)]
    pub issues: Vec<String>,
    #[serde(default)]
    pub summary: String,
}

/// Timegrapher figures as read by the delegate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimegrapherReading {
    /// Seconds per day, signed
    pub rate: f32,
    /// Balance amplitude in degrees
    pub amplitude: f32,
    /// Milliseconds
    pub beat_error: f32,
    #[serde(default)]
    pub summary: String,
}

impl TimegrapherReading {
    /// Display bands for (rate, amplitude, beat error)
    pub fn bands(&self) -> (Band, Band, Band) {
        (
            bands::rate_band(self.rate),
            bands::amplitude_band(self.amplitude),
            bands::beat_error_band(self.beat_error),
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum AnalysisReport {
    Alignment(AlignmentVerdict),
    Timegrapher(TimegrapherReading),
}

impl AnalysisReport {
    /// Parse a delegate's JSON answer for the given mode
    pub fn parse(mode: AnalysisMode, json: &str) -> Result<Self> {
        let malformed = |e: serde_json::Error| Error::Delegate(format!("malformed response: {e}"));
        match mode {
            AnalysisMode::Alignment => serde_json::from_str(json)
                .map(AnalysisReport::Alignment)
                .map_err(malformed),
            AnalysisMode::Timegrapher => serde_json::from_str(json)
                .map(AnalysisReport::Timegrapher)
                .map_err(malformed),
        }
    }

    pub fn mode(&self) -> AnalysisMode {
        match self {
            AnalysisReport::Alignment(_) => AnalysisMode::Alignment,
            AnalysisReport::Timegrapher(_) => AnalysisMode::Timegrapher,
        }
    }

    pub fn summary(&self) -> &str {
        match self {
            AnalysisReport::Alignment(v) => &v.summary,
            AnalysisReport::Timegrapher(r) => &r.summary,
        }
    }
}
