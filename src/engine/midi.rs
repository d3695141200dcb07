//! MIDI output for padmidi.
//!
//! The OutputSink trait is what the translator talks to; MidiSink delivers
//! those messages to a midir output port.

use midir::{MidiOutput, MidiOutputConnection};
use tracing::{info, warn};

use crate::error::{Error, Result};
use crate::prompt::{choose_index, AdjustmentPrompt};

/// Client name registered with the MIDI backend
const CLIENT_NAME: &str = "padmidi";

/// MIDI message types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MidiMessage {
    /// Note on: channel (0-15), note (0-127), velocity (0-127)
    NoteOn(u8, u8, u8),
    /// Note off: channel (0-15), note (0-127), velocity (0-127)
    NoteOff(u8, u8, u8),
    /// Control change: channel (0-15), controller (0-127), value (0-127)
    ControlChange(u8, u8, u8),
}

impl MidiMessage {
    /// Convert to raw MIDI bytes.
    pub fn to_bytes(&self) -> [u8; 3] {
        match *self {
            MidiMessage::NoteOn(ch, note, vel) => [0x90 | (ch & 0x0F), note & 0x7F, vel & 0x7F],
            MidiMessage::NoteOff(ch, note, vel) => [0x80 | (ch & 0x0F), note & 0x7F, vel & 0x7F],
            MidiMessage::ControlChange(ch, ctrl, val) => {
                [0xB0 | (ch & 0x0F), ctrl & 0x7F, val & 0x7F]
            }
        }
    }
}

/// Downstream consumer of translated messages
pub trait OutputSink {
    /// Send a control change (value 0-127)
    fn send_control(&mut self, controller: u8, value: u8) -> Result<()>;

    /// Send a note on
    fn send_note_on(&mut self, note: u8) -> Result<()>;

    /// Send a note off
    fn send_note_off(&mut self, note: u8) -> Result<()>;

    /// Close the output; later sends fail
    fn close(&mut self);
}

/// How to pick the output port
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PortSelector {
    /// First port whose name contains this text
    Named(String),
    /// First available port
    First,
    /// Ask the user, unless there is only one port
    Interactive,
}

/// OutputSink writing to a midir connection
pub struct MidiSink {
    conn: Option<MidiOutputConnection>,
    port_name: String,
    channel: u8,
    velocity: u8,
}

impl MidiSink {
    /// Connect to the port chosen by `selector`
    pub fn connect<P: AdjustmentPrompt + ?Sized>(
        selector: &PortSelector,
        prompt: &mut P,
        channel: u8,
        velocity: u8,
    ) -> Result<Self> {
        let midi_out = new_output()?;
        let ports = midi_out.ports();

        if ports.is_empty() {
            return Err(Error::NoOutputTargetFound);
        }

        let names: Vec<String> = ports
            .iter()
            .map(|p| midi_out.port_name(p).unwrap_or_else(|_| "Unknown".to_string()))
            .collect();

        let index = match selector {
            PortSelector::Named(name) => names
                .iter()
                .position(|n| n.contains(name.as_str()))
                .ok_or_else(|| Error::PortNotFound(name.clone()))?,
            PortSelector::First => {
                info!(port = %names[0], "auto-selecting MIDI port");
                0
            }
            PortSelector::Interactive if names.len() == 1 => 0,
            PortSelector::Interactive => {
                println!("\nAvailable MIDI ports:\n");
                choose_index(prompt, "\nEnter the port number you want to use: ", &names)?
            }
        };

        let port_name = names[index].clone();
        let conn = midi_out
            .connect(&ports[index], "padmidi-output")
            .map_err(|e| Error::OutputFailure(e.to_string()))?;

        info!(port = %port_name, channel, "connected to MIDI output");

        Ok(Self {
            conn: Some(conn),
            port_name,
            channel: channel & 0x0F,
            velocity: velocity & 0x7F,
        })
    }

    /// Name of the connected port
    pub fn port_name(&self) -> &str {
        &self.port_name
    }

    /// Send a raw MIDI message.
    pub fn send(&mut self, msg: MidiMessage) -> Result<()> {
        let conn = self
            .conn
            .as_mut()
            .ok_or_else(|| Error::OutputFailure("output is closed".to_string()))?;
        conn.send(&msg.to_bytes())
            .map_err(|e| Error::OutputFailure(e.to_string()))
    }
}

impl OutputSink for MidiSink {
    fn send_control(&mut self, controller: u8, value: u8) -> Result<()> {
        self.send(MidiMessage::ControlChange(self.channel, controller, value))
    }

    fn send_note_on(&mut self, note: u8) -> Result<()> {
        self.send(MidiMessage::NoteOn(self.channel, note, self.velocity))
    }

    fn send_note_off(&mut self, note: u8) -> Result<()> {
        self.send(MidiMessage::NoteOff(self.channel, note, 0))
    }

    fn close(&mut self) {
        if let Some(conn) = self.conn.take() {
            conn.close();
            info!(port = %self.port_name, "closed MIDI output");
        }
    }
}

impl Drop for MidiSink {
    fn drop(&mut self) {
        self.close();
    }
}

fn new_output() -> Result<MidiOutput> {
    MidiOutput::new(CLIENT_NAME).map_err(|e| {
        warn!(error = %e, "MIDI backend unavailable");
        Error::NoOutputTargetFound
    })
}

/// List available MIDI output ports.
pub fn list_midi_ports() -> Result<Vec<String>> {
    let midi_out = new_output()?;
    let ports = midi_out.ports();

    let names: Vec<String> = ports
        .iter()
        .filter_map(|p| midi_out.port_name(p).ok())
        .collect();

    Ok(names)
}
