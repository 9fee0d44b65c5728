//! Good/warn/bad display bands for timegrapher figures
//!
//! Pure functions of the returned numbers; nothing here feeds back into state.

/// Rate within ±6 s/d is good, within ±15 s/d is a warning
pub const RATE_GOOD: f32 = 6.0;
pub const RATE_WARN: f32 = 15.0;
/// Amplitude of 270° or more is good, 220° or more is a warning
pub const AMPLITUDE_GOOD: f32 = 270.0;
pub const AMPLITUDE_WARN: f32 = 220.0;
/// Beat error up to 0.6 ms is good, up to 1.0 ms is a warning
pub const BEAT_ERROR_GOOD: f32 = 0.6;
pub const BEAT_ERROR_WARN: f32 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Band {
    Good,
    Warn,
    Bad,
}

impl Band {
    pub fn label(self) -> &'static str {
        match self {
            Band::Good => "good",
            Band::Warn => "warn",
            Band::Bad => "bad",
        }
    }
}

pub fn rate_band(rate: f32) -> Band {
    let magnitude = rate.abs();
    if magnitude <= RATE_GOOD {
        Band::Good
    } else if magnitude <= RATE_WARN {
        Band::Warn
    } else {
        Band::Bad
    }
}

pub fn amplitude_band(amplitude: f32) -> Band {
    if amplitude >= AMPLITUDE_GOOD {
        Band::Good
    } else if amplitude >= AMPLITUDE_WARN {
        Band::Warn
    } else {
        Band::Bad
    }
}

pub fn beat_error_band(beat_error: f32) -> Band {
    let magnitude = beat_error.abs();
    if magnitude <= BEAT_ERROR_GOOD {
        Band::Good
    } else if magnitude <= BEAT_ERROR_WARN {
        Band::Warn
    } else {
        Band::Bad
    }
}
