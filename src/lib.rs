//! padmidi - Turn a gamepad into a MIDI controller
//!
//! Samples sticks, triggers and buttons at a fixed interval and sends control
//! changes and notes for whatever moved. Sticks and triggers go out as CC
//! pairs, buttons as note on/off.

pub mod config;
pub mod engine;
pub mod error;
pub mod mapping;
pub mod prompt;
pub mod sources;

pub use config::PadConfig;
pub use engine::Engine;
pub use error::{Error, Result};
