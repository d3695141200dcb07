//! Configuration schema definitions

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::time::Duration;

use crate::mapping::{ChannelKind, DEFAULT_DEAD_ZONE};

/// Main configuration for padmidi
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PadConfig {
    /// MIDI output settings
    pub midi: MidiConfig,

    /// Input device settings
    pub device: DeviceConfig,

    /// Dead zone and change threshold
    pub filter: FilterConfig,

    /// Stick sensitivity settings
    pub sensitivity: SensitivityConfig,

    /// Delay between ticks in milliseconds (default: 10)
    pub tick_interval_ms: u64,

    /// Analog axis pairs sent as control changes
    pub pairs: Vec<PairConfig>,

    /// Button id -> MIDI note
    pub buttons: BTreeMap<u32, u8>,

    /// Button that enters sensitivity adjustment (default: 7, Start)
    pub mode_switch_button: u32,
}

impl Default for PadConfig {
    fn default() -> Self {
        Self {
            midi: MidiConfig::default(),
            device: DeviceConfig::default(),
            filter: FilterConfig::default(),
            sensitivity: SensitivityConfig::default(),
            tick_interval_ms: 10,
            pairs: default_pairs(),
            buttons: BTreeMap::from([(0, 60), (1, 62), (2, 64), (3, 65)]),
            mode_switch_button: 7,
        }
    }
}

impl PadConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        // Validate MIDI settings
        if self.midi.channel > 15 {
            bail!("MIDI channel must be between 0 and 15");
        }
        if self.midi.velocity == 0 || self.midi.velocity > 127 {
            bail!("Velocity must be between 1 and 127");
        }

        // Validate filter settings
        let dead_zone = self.filter.dead_zone;
        if !(0.0..1.0).contains(&dead_zone) {
            bail!("Dead zone must be at least 0.0 and below 1.0");
        }
        let threshold = self.filter.change_threshold();
        if !(0.0..1.0).contains(&threshold) {
            bail!("Change threshold must be at least 0.0 and below 1.0");
        }

        if !(0.0..=1.0).contains(&self.sensitivity.initial) {
            bail!("Initial sensitivity must be between 0.0 and 1.0");
        }
        if self.sensitivity.max_attempts == Some(0) {
            bail!("Sensitivity max_attempts must be at least 1");
        }

        if self.tick_interval_ms == 0 || self.tick_interval_ms > 1000 {
            bail!("Tick interval must be between 1 and 1000 ms");
        }

        // Validate pairs
        let mut channels = HashSet::new();
        for pair in &self.pairs {
            if pair.name.trim().is_empty() {
                bail!("Axis pairs must have a name");
            }
            for axis in [&pair.x, &pair.y] {
                if axis.controller > 127 {
                    bail!(
                        "Pair '{}' uses controller {} (must be 0-127)",
                        pair.name,
                        axis.controller
                    );
                }
                if !channels.insert(axis.channel) {
                    bail!("Axis channel {} is bound more than once", axis.channel);
                }
            }
        }

        // Validate buttons
        for (button, note) in &self.buttons {
            if *note > 127 {
                bail!("Button {} maps to note {} (must be 0-127)", button, note);
            }
        }

        Ok(())
    }

    /// Delay between ticks
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }
}

/// MIDI output configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MidiConfig {
    /// MIDI channel 0-15 (default: 0)
    pub channel: u8,

    /// Note-on velocity (default: 127)
    pub velocity: u8,

    /// Output port name, matched as a substring (None = choose)
    pub port: Option<String>,

    /// Take the first port instead of asking (default: false)
    pub auto_select: bool,
}

impl Default for MidiConfig {
    fn default() -> Self {
        Self {
            channel: 0,
            velocity: 127,
            port: None,
            auto_select: false,
        }
    }
}

/// Input device configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviceConfig {
    /// Index of the device to open (default: 0)
    pub index: u32,

    /// Axes the bindings expect the device to have (default: 6)
    pub expected_axes: u32,

    /// Buttons the bindings expect the device to have (default: 8)
    pub expected_buttons: u32,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            index: 0,
            expected_axes: 6,
            expected_buttons: 8,
        }
    }
}

/// Change filter configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    /// Readings below this magnitude snap to rest (default: 0.1)
    pub dead_zone: f32,

    /// Minimum change worth sending (default: same as dead_zone)
    pub change_threshold: Option<f32>,
}

impl FilterConfig {
    /// Effective change threshold
    pub fn change_threshold(&self) -> f32 {
        self.change_threshold.unwrap_or(self.dead_zone)
    }
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            dead_zone: DEFAULT_DEAD_ZONE,
            change_threshold: None,
        }
    }
}

/// Sensitivity configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SensitivityConfig {
    /// Starting stick sensitivity 0.0-1.0 (default: 1.0)
    pub initial: f32,

    /// Give up adjusting after this many invalid answers (None = keep asking)
    pub max_attempts: Option<u32>,
}

impl Default for SensitivityConfig {
    fn default() -> Self {
        Self {
            initial: 1.0,
            max_attempts: None,
        }
    }
}

/// Two analog axes sent together
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PairConfig {
    /// Name used in logs
    pub name: String,

    /// Stick or trigger behaviour
    #[serde(default)]
    pub kind: ChannelKind,

    /// First axis
    pub x: AxisConfig,

    /// Second axis
    pub y: AxisConfig,
}

/// Binding of one analog channel to a controller number
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AxisConfig {
    /// Device axis index
    pub channel: u32,

    /// MIDI CC number
    pub controller: u8,

    /// Flip polarity before normalizing
    #[serde(default)]
    pub invert: bool,
}

impl AxisConfig {
    pub fn new(channel: u32, controller: u8) -> Self {
        Self {
            channel,
            controller,
            invert: false,
        }
    }

    pub fn inverted(mut self) -> Self {
        self.invert = true;
        self
    }
}

fn default_pairs() -> Vec<PairConfig> {
    vec![
        PairConfig {
            name: "left stick".to_string(),
            kind: ChannelKind::Bidirectional,
            x: AxisConfig::new(0, 16),
            y: AxisConfig::new(1, 1).inverted(),
        },
        PairConfig {
            name: "right stick".to_string(),
            kind: ChannelKind::Bidirectional,
            x: AxisConfig::new(2, 17),
            y: AxisConfig::new(3, 11).inverted(),
        },
        PairConfig {
            name: "triggers".to_string(),
            kind: ChannelKind::Unidirectional,
            x: AxisConfig::new(4, 18),
            y: AxisConfig::new(5, 19),
        },
    ]
}
