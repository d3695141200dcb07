//! Input sources for padmidi
//!
//! Sources sample a human-interface device and hand DeviceSnapshots to the
//! translator.

#[cfg(feature = "gamepad")]
mod gamepad;
mod source;

#[cfg(feature = "gamepad")]
pub use gamepad::{normalize_axis, GamepadSource};
pub use source::{DeviceHandle, DeviceSnapshot, InputSource};
