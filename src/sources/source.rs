//! InputSource trait and DeviceSnapshot definition

use std::collections::BTreeMap;

use crate::error::Result;

/// An enumerated input device
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceHandle {
    /// Backend device index
    pub index: u32,

    /// Human-readable device name
    pub name: String,
}

impl DeviceHandle {
    pub fn new(index: u32, name: impl Into<String>) -> Self {
        Self {
            index,
            name: name.into(),
        }
    }
}

/// A point-in-time reading of a device
#[derive(Debug, Clone)]
pub struct DeviceSnapshot {
    /// Analog channel values in [-1, 1], ordered by channel index
    pub axes: Vec<f32>,

    /// Pressed state of each discrete input
    pub buttons: BTreeMap<u32, bool>,
}

impl DeviceSnapshot {
    /// Create an empty snapshot
    pub fn new() -> Self {
        Self {
            axes: Vec::new(),
            buttons: BTreeMap::new(),
        }
    }

    /// Append the next analog channel
    pub fn with_axis(mut self, value: f32) -> Self {
        self.axes.push(value);
        self
    }

    /// Set a button state
    pub fn with_button(mut self, id: u32, pressed: bool) -> Self {
        self.buttons.insert(id, pressed);
        self
    }

    /// Value of an analog channel, if the device has it
    pub fn axis(&self, channel: u32) -> Option<f32> {
        self.axes.get(channel as usize).copied()
    }

    /// Whether a button is pressed; absent buttons read as released
    pub fn button(&self, id: u32) -> bool {
        self.buttons.get(&id).copied().unwrap_or(false)
    }
}

impl Default for DeviceSnapshot {
    fn default() -> Self {
        Self::new()
    }
}

/// Trait for input devices the translator can sample
pub trait InputSource {
    /// List the connected devices
    fn enumerate_devices(&mut self) -> Result<Vec<DeviceHandle>>;

    /// Open a device for polling
    fn open(&mut self, device: &DeviceHandle) -> Result<()>;

    /// Bring the device state up to date; fails if the device is gone
    fn refresh(&mut self, device: &DeviceHandle) -> Result<()>;

    /// Read the latest known state without blocking
    fn poll(&mut self, device: &DeviceHandle) -> Result<DeviceSnapshot> {
        self.refresh(device)?;

        let mut snapshot = DeviceSnapshot::new();
        for channel in 0..self.axis_count(device)? {
            snapshot = snapshot.with_axis(self.analog_get(device, channel)?);
        }
        for id in 0..self.button_count(device)? {
            snapshot = snapshot.with_button(id, self.digital_get(device, id)?);
        }
        Ok(snapshot)
    }

    /// Read a single button
    fn digital_get(&self, device: &DeviceHandle, id: u32) -> Result<bool>;

    /// Read a single analog channel, normalized to [-1, 1]
    fn analog_get(&self, device: &DeviceHandle, channel: u32) -> Result<f32>;

    /// Number of analog channels the device exposes
    fn axis_count(&self, device: &DeviceHandle) -> Result<u32>;

    /// Number of buttons the device exposes
    fn button_count(&self, device: &DeviceHandle) -> Result<u32>;

    /// Release the device handle
    fn release(&mut self, device: &DeviceHandle);
}
