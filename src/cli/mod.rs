//! CLI interface for padmidi

use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;

/// Turn a gamepad into a MIDI controller
#[derive(Parser)]
#[command(name = "padmidi")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// More log output (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Translate gamepad input into MIDI until interrupted
    Run {
        /// Configuration file path (built-in defaults when omitted)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// MIDI output port name (substring match)
        #[arg(short, long)]
        port: Option<String>,

        /// Use the first MIDI port instead of asking
        #[arg(long)]
        auto_select: bool,

        /// Gamepad index to open
        #[arg(short, long)]
        device: Option<u32>,

        /// Starting stick sensitivity (0 to 1)
        #[arg(short, long)]
        sensitivity: Option<f32>,
    },

    /// List connected gamepads
    Devices,

    /// List available MIDI output ports
    Ports,

    /// Validate a configuration file
    Check {
        /// Configuration file path
        #[arg(short, long, default_value = "padmidi.yaml")]
        config: PathBuf,

        /// Print the resolved configuration as JSON
        #[arg(long)]
        json: bool,
    },

    /// Generate an example configuration file
    Init,
}
