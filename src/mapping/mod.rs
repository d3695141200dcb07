//! Mapping from raw device readings to MIDI-ready values
//!
//! Normalizes analog axes, filters insignificant changes and detects
//! button edges.

mod edge;
mod filter;
mod normalize;

pub use edge::{Edge, EdgeDetector};
pub use filter::{ChangeFilter, DEFAULT_DEAD_ZONE};
pub use normalize::{normalize, to_midi_value, ChannelKind, Sensitivity};
