//! SDL2 gamepad source
//!
//! Reads joysticks through SDL2's joystick API by raw axis and button index,
//! so any controller SDL can open works without a mapping database entry.

use sdl2::event::Event;
use sdl2::joystick::Joystick;
use sdl2::{EventPump, JoystickSubsystem, Sdl};
use tracing::{debug, info, warn};

use super::{DeviceHandle, InputSource};
use crate::error::{Error, Result};

/// Normalize a raw SDL axis value to [-1, 1]
pub fn normalize_axis(raw: i16) -> f32 {
    // -32768 has no positive mirror, clamp to a symmetric range
    let clamped = (raw as i32).clamp(-32767, 32767) as f32;
    (clamped / 32767.0).clamp(-1.0, 1.0)
}

/// Input source backed by SDL2 joysticks
pub struct GamepadSource {
    _sdl: Sdl,
    subsystem: JoystickSubsystem,
    event_pump: EventPump,
    opened: Option<Joystick>,
    removed: bool,
}

impl GamepadSource {
    /// Initialize SDL's joystick subsystem
    pub fn new() -> Result<Self> {
        // Some controllers only report on Windows with a dedicated thread
        sdl2::hint::set("SDL_JOYSTICK_THREAD", "1");
        // There is no window, so input must not depend on focus
        sdl2::hint::set("SDL_JOYSTICK_ALLOW_BACKGROUND_EVENTS", "1");

        let sdl = sdl2::init().map_err(Error::BackendInit)?;
        let subsystem = sdl.joystick().map_err(Error::BackendInit)?;
        let event_pump = sdl.event_pump().map_err(Error::BackendInit)?;

        Ok(Self {
            _sdl: sdl,
            subsystem,
            event_pump,
            opened: None,
            removed: false,
        })
    }

    fn joystick(&self, device: &DeviceHandle) -> Result<&Joystick> {
        match &self.opened {
            Some(joystick) if !self.removed && joystick.attached() => Ok(joystick),
            Some(_) => Err(Error::DeviceReadFailure(format!(
                "'{}' is disconnected",
                device.name
            ))),
            None => Err(Error::DeviceReadFailure(format!(
                "'{}' is not open",
                device.name
            ))),
        }
    }

    /// Drain SDL's event queue, which also refreshes joystick state
    fn pump(&mut self) {
        let instance = self.opened.as_ref().map(|j| j.instance_id());
        for event in self.event_pump.poll_iter() {
            match event {
                Event::JoyDeviceRemoved { which, .. } if Some(which) == instance => {
                    warn!(instance = which, "gamepad removed");
                    self.removed = true;
                }
                Event::JoyDeviceAdded { which, .. } => {
                    debug!(index = which, "gamepad added");
                }
                _ => {}
            }
        }
    }
}

impl InputSource for GamepadSource {
    fn enumerate_devices(&mut self) -> Result<Vec<DeviceHandle>> {
        let available = self.subsystem.num_joysticks().map_err(|e| {
            Error::DeviceReadFailure(format!("can't enumerate joysticks: {}", e))
        })?;

        let devices = (0..available)
            .filter_map(|index| match self.subsystem.name_for_index(index) {
                Ok(name) => Some(DeviceHandle::new(index, name)),
                Err(e) => {
                    debug!(index, error = %e, "skipping unnamed joystick");
                    None
                }
            })
            .collect();

        Ok(devices)
    }

    fn open(&mut self, device: &DeviceHandle) -> Result<()> {
        let joystick = self.subsystem.open(device.index).map_err(|e| {
            Error::DeviceReadFailure(format!("failed to open '{}': {}", device.name, e))
        })?;

        info!(
            name = %joystick.name(),
            axes = joystick.num_axes(),
            buttons = joystick.num_buttons(),
            "opened gamepad"
        );

        self.opened = Some(joystick);
        self.removed = false;
        Ok(())
    }

    fn refresh(&mut self, device: &DeviceHandle) -> Result<()> {
        self.pump();
        self.joystick(device).map(|_| ())
    }

    fn digital_get(&self, device: &DeviceHandle, id: u32) -> Result<bool> {
        self.joystick(device)?
            .button(id)
            .map_err(|e| Error::DeviceReadFailure(e.to_string()))
    }

    fn analog_get(&self, device: &DeviceHandle, channel: u32) -> Result<f32> {
        self.joystick(device)?
            .axis(channel)
            .map(normalize_axis)
            .map_err(|e| Error::DeviceReadFailure(e.to_string()))
    }

    fn axis_count(&self, device: &DeviceHandle) -> Result<u32> {
        Ok(self.joystick(device)?.num_axes())
    }

    fn button_count(&self, device: &DeviceHandle) -> Result<u32> {
        Ok(self.joystick(device)?.num_buttons())
    }

    fn release(&mut self, device: &DeviceHandle) {
        if self.opened.take().is_some() {
            info!(name = %device.name, "released gamepad");
        }
    }
}
