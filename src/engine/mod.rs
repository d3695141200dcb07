//! Translation engine for padmidi
//!
//! Drives the translator at a fixed tick interval, switches into the
//! sensitivity prompt when asked to, and tears everything down in order when
//! stopped.

mod midi;
mod translator;

pub use midi::{list_midi_ports, MidiMessage, MidiSink, OutputSink, PortSelector};
pub use translator::{AdjustOutcome, Mode, TickReport, Translator};

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use tracing::{info, warn};

use crate::config::PadConfig;
use crate::error::{Error, Result};
use crate::prompt::AdjustmentPrompt;
use crate::sources::{DeviceHandle, InputSource};

/// Counters collected over one run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunStats {
    /// Ticks that read the device
    pub ticks: u64,
    /// Ticks skipped because the device could not be read
    pub skipped: u64,
    /// Messages delivered
    pub sent: u64,
    /// Messages the sink refused
    pub failed: u64,
    /// Completed sensitivity adjustments
    pub adjustments: u64,
}

/// The main translation engine
pub struct Engine {
    translator: Translator,
    interval: Duration,
    running: Arc<AtomicBool>,
}

impl Engine {
    /// Create a new engine with the given configuration
    pub fn new(config: &PadConfig) -> Result<Self> {
        Ok(Self {
            translator: Translator::new(config)?,
            interval: config.tick_interval(),
            running: Arc::new(AtomicBool::new(true)),
        })
    }

    /// Override the tick interval
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn translator(&self) -> &Translator {
        &self.translator
    }

    /// Flag that keeps the loop alive; clear it to stop
    pub fn running_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.running)
    }

    /// Whether the engine has not been stopped yet
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Ask the loop to stop at the top of its next iteration
    pub fn stop(&self) {
        self.running.store(false, Ordering::SeqCst);
    }

    /// Run until stopped, then release the device and close the sink.
    /// Returns right away (after teardown) if already stopped.
    ///
    /// Device read failures skip the tick; nothing inside a tick ends the
    /// loop.
    pub fn run<I, O, P>(
        &mut self,
        source: &mut I,
        device: &DeviceHandle,
        sink: &mut O,
        prompt: &mut P,
    ) -> RunStats
    where
        I: InputSource + ?Sized,
        O: OutputSink + ?Sized,
        P: AdjustmentPrompt + ?Sized,
    {
        let mut stats = RunStats::default();

        while self.is_running() {
            match self.translator.mode() {
                Mode::Running => match source.poll(device) {
                    Ok(snapshot) => {
                        let report = self.translator.tick(&snapshot, sink);
                        stats.ticks += 1;
                        stats.sent += report.sent as u64;
                        stats.failed += report.failed as u64;
                    }
                    Err(e) => {
                        stats.skipped += 1;
                        // a sustained unplug would otherwise log every tick
                        if stats.skipped.is_power_of_two() {
                            warn!(error = %e, skipped = stats.skipped, "skipping tick");
                        }
                    }
                },
                Mode::Adjusting => {
                    if let AdjustOutcome::Adjusted(_) = self.translator.adjust(prompt) {
                        stats.adjustments += 1;
                    }
                    continue;
                }
            }

            if !self.interval.is_zero() {
                thread::sleep(self.interval);
            }
        }

        source.release(device);
        sink.close();
        info!(
            ticks = stats.ticks,
            sent = stats.sent,
            skipped = stats.skipped,
            "translation stopped"
        );

        stats
    }
}

/// Find and open the configured device.
///
/// Fails with `NoDeviceFound` when nothing is connected. A device with fewer
/// channels than expected is opened anyway; unbound channels just never fire.
pub fn open_device<I: InputSource + ?Sized>(
    source: &mut I,
    config: &PadConfig,
) -> Result<DeviceHandle> {
    let devices = source.enumerate_devices()?;
    if devices.is_empty() {
        return Err(Error::NoDeviceFound);
    }

    for device in &devices {
        info!(index = device.index, name = %device.name, "found gamepad");
    }

    let device = match devices.iter().find(|d| d.index == config.device.index) {
        Some(device) => device.clone(),
        None => {
            warn!(
                index = config.device.index,
                "configured device not present, using the first one"
            );
            devices[0].clone()
        }
    };

    source.open(&device)?;

    let axes = source.axis_count(&device)?;
    let buttons = source.button_count(&device)?;
    if axes < config.device.expected_axes {
        warn!(
            axes,
            expected = config.device.expected_axes,
            "device has fewer axes than expected"
        );
    }
    if buttons < config.device.expected_buttons {
        warn!(
            buttons,
            expected = config.device.expected_buttons,
            "device has fewer buttons than expected"
        );
    }

    Ok(device)
}
