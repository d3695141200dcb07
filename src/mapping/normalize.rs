//! Signal normalizer
//!
//! Converts raw axis readings into canonical values and canonical values
//! into 7-bit MIDI data bytes.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// How an analog channel rests and moves
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ChannelKind {
    /// Centered axis in [-1, 1], e.g. a stick
    #[default]
    Bidirectional,
    /// Axis resting at one end, e.g. a trigger; canonical range [0, 1]
    Unidirectional,
}

/// Stick sensitivity, always within [0, 1]
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Sensitivity(f32);

impl Sensitivity {
    /// Full-scale sensitivity
    pub const FULL: Sensitivity = Sensitivity(1.0);

    /// Create a sensitivity, rejecting values outside [0, 1] (and NaN)
    pub fn new(value: f32) -> Result<Self> {
        if (0.0..=1.0).contains(&value) {
            Ok(Self(value))
        } else {
            Err(Error::InvalidSensitivityInput(value.to_string()))
        }
    }

    /// Get the raw scalar
    pub fn value(self) -> f32 {
        self.0
    }
}

impl Default for Sensitivity {
    fn default() -> Self {
        Self::FULL
    }
}

impl std::fmt::Display for Sensitivity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Normalize a raw reading in [-1, 1] into a canonical value.
///
/// Sticks are scaled by `sensitivity`; triggers are re-ranged to [0, 1] and
/// ignore sensitivity entirely. `invert` flips the raw polarity first.
pub fn normalize(raw: f32, kind: ChannelKind, invert: bool, sensitivity: Sensitivity) -> f32 {
    let raw = if invert { -raw } else { raw };
    match kind {
        ChannelKind::Bidirectional => raw * sensitivity.value(),
        ChannelKind::Unidirectional => ((raw + 1.0) / 2.0).clamp(0.0, 1.0),
    }
}

/// Map a canonical value onto a MIDI data byte (0-127), truncating
pub fn to_midi_value(value: f32, kind: ChannelKind) -> u8 {
    let unit = match kind {
        ChannelKind::Bidirectional => (value + 1.0) / 2.0,
        ChannelKind::Unidirectional => value,
    };
    (unit.clamp(0.0, 1.0) * 127.0) as u8
}
