//! Reference overlay configuration

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Which reference guide to draw over the image
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OverlayKind {
    /// Twelve radiating spokes with hub and alignment ring
    #[default]
    Indices,
    /// Square crosshatch
    Grid,
}

impl OverlayKind {
    pub fn name(self) -> &'static str {
        match self {
            OverlayKind::Indices => "indices",
            OverlayKind::Grid => "grid",
        }
    }

    /// Get the next overlay kind in the cycle
    pub fn next(self) -> Self {
        match self {
            OverlayKind::Indices => OverlayKind::Grid,
            OverlayKind::Grid => OverlayKind::Indices,
        }
    }
}

impl FromStr for OverlayKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "indices" => Ok(OverlayKind::Indices),
            "grid" => Ok(OverlayKind::Grid),
            _ => Err(Error::UnknownOverlayKind(s.to_string())),
        }
    }
}

impl fmt::Display for OverlayKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Opaque RGB color, written as `#rrggbb`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct HexColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl HexColor {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// RGBA bytes with the given opacity (0.0-1.0)
    pub fn to_rgba_u8(self, opacity: f32) -> [u8; 4] {
        let a = (opacity.clamp(0.0, 1.0) * 255.0).round() as u8;
        [self.r, self.g, self.b, a]
    }
}

impl Default for HexColor {
    fn default() -> Self {
        // Red reads well against both light and dark dials
        Self::rgb(0xff, 0x00, 0x00)
    }
}

impl FromStr for HexColor {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || Error::InvalidColor(s.to_string());
        let hex = s.trim().strip_prefix('#').ok_or_else(invalid)?;
        if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(invalid());
        }
        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).map_err(|_| invalid());
        Ok(Self::rgb(channel(0)?, channel(2)?, channel(4)?))
    }
}

impl TryFrom<String> for HexColor {
    type Error = Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<HexColor> for String {
    fn from(c: HexColor) -> Self {
        c.to_string()
    }
}

impl fmt::Display for HexColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// Smallest guide size, in percent of its derived box
pub const MIN_SCALE_PERCENT: f32 = 10.0;
/// Largest guide size, in percent of its derived box
pub const MAX_SCALE_PERCENT: f32 = 400.0;
/// Largest guide side in logical pixels, before the scale percent
pub const MAX_GUIDE_SIDE: f32 = 16_384.0;

/// Clamp a guide size percentage; NaN falls back to 100%
pub fn clamp_scale_percent(pct: f32) -> f32 {
    if pct.is_nan() {
        return default_scale_percent();
    }
    pct.clamp(MIN_SCALE_PERCENT, MAX_SCALE_PERCENT)
}

/// Overlay settings. Survives image swaps; only tool selections change it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OverlayConfig {
    pub kind: OverlayKind,
    pub color: HexColor,
    /// Rotation of the guide around its center
    #[serde(default)]
    pub rotation_deg: f32,
    /// Guide size relative to its derived box, in percent
    #[serde(default = "default_scale_percent")]
    pub scale_percent: f32,
    #[serde(default)]
    pub offset_x: f32,
    #[serde(default)]
    pub offset_y: f32,
}

fn default_scale_percent() -> f32 {
    100.0
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self::new(OverlayKind::default(), HexColor::default())
    }
}

impl OverlayConfig {
    pub fn new(kind: OverlayKind, color: HexColor) -> Self {
        Self {
            kind,
            color,
            rotation_deg: 0.0,
            scale_percent: default_scale_percent(),
            offset_x: 0.0,
            offset_y: 0.0,
        }
    }

    /// Reset geometry, keeping kind and color
    pub fn reset_geometry(&mut self) {
        *self = Self::new(self.kind, self.color);
    }

    /// Set the guide size, clamped to [`MIN_SCALE_PERCENT`], [`MAX_SCALE_PERCENT`]
    pub fn set_scale_percent(&mut self, pct: f32) {
        if !pct.is_nan() {
            self.scale_percent = clamp_scale_percent(pct);
        }
    }

    /// Set the guide rotation, wrapped to one turn
    pub fn set_rotation(&mut self, deg: f32) {
        if deg.is_finite() {
            self.rotation_deg = deg % 360.0;
        }
    }

    pub fn has_identity_geometry(&self) -> bool {
        *self == Self::new(self.kind, self.color)
    }
}
