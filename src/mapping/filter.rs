//! Change filter
//!
//! Snaps small readings to rest and decides whether a new value differs
//! enough from the last emitted one to be worth sending.

/// Default rest dead zone and change threshold
pub const DEFAULT_DEAD_ZONE: f32 = 0.1;

/// Dead-zone and change-threshold gate
///
/// The dead zone zeroes readings whose magnitude is below it. The change
/// threshold is the minimum distance from the last emitted value that counts
/// as a change. Both default to the same value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChangeFilter {
    dead_zone: f32,
    change_threshold: f32,
}

impl ChangeFilter {
    /// Create a filter using `dead_zone` for both rest snapping and change gating
    pub fn new(dead_zone: f32) -> Self {
        let dead_zone = dead_zone.abs();
        Self {
            dead_zone,
            change_threshold: dead_zone,
        }
    }

    /// Use a separate change threshold
    pub fn with_change_threshold(mut self, threshold: f32) -> Self {
        self.change_threshold = threshold.abs();
        self
    }

    pub fn dead_zone(&self) -> f32 {
        self.dead_zone
    }

    pub fn change_threshold(&self) -> f32 {
        self.change_threshold
    }

    /// Zero a value inside the dead zone
    pub fn snap(&self, value: f32) -> f32 {
        if value.abs() < self.dead_zone {
            0.0
        } else {
            value
        }
    }

    /// Whether `value` is far enough from `previous` to emit
    pub fn changed(&self, value: f32, previous: f32) -> bool {
        (value - previous).abs() > self.change_threshold
    }

    /// Gate a pair of axes as one unit.
    ///
    /// Returns the snapped pair when either axis changed, so both get sent
    /// together. Returns `None` when neither did; the caller keeps its cache.
    pub fn gate_pair(&self, values: [f32; 2], previous: [f32; 2]) -> Option<[f32; 2]> {
        let snapped = [self.snap(values[0]), self.snap(values[1])];
        if self.changed(snapped[0], previous[0]) || self.changed(snapped[1], previous[1]) {
            Some(snapped)
        } else {
            None
        }
    }
}

impl Default for ChangeFilter {
    fn default() -> Self {
        Self::new(DEFAULT_DEAD_ZONE)
    }
}
