//! padmidi - Turn a gamepad into a MIDI controller

use anyhow::Result;
use clap::Parser;
use padmidi::config::{self, PadConfig};
use padmidi::engine;
use tracing::Level;

mod cli;

use cli::{Cli, Commands};

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => Level::INFO,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Run {
            config: config_path,
            port,
            auto_select,
            device,
            sensitivity,
        } => {
            let mut cfg = config::load_or_default(config_path.as_deref())?;
            if port.is_some() {
                cfg.midi.port = port;
            }
            if auto_select {
                cfg.midi.auto_select = true;
            }
            if let Some(index) = device {
                cfg.device.index = index;
            }
            if let Some(sensitivity) = sensitivity {
                cfg.sensitivity.initial = sensitivity;
            }
            cfg.validate()?;

            run(cfg)?;
        }

        Commands::Devices => list_devices()?,

        Commands::Ports => {
            let ports = engine::list_midi_ports()?;
            if ports.is_empty() {
                println!("No MIDI output ports found.");
            } else {
                println!("MIDI output ports:");
                for (i, name) in ports.iter().enumerate() {
                    println!("  {}: {}", i, name);
                }
            }
        }

        Commands::Check {
            config: config_path,
            json,
        } => {
            println!("Checking configuration at {:?}...", config_path);

            match config::load_config(&config_path) {
                Ok(cfg) if json => {
                    println!("{}", serde_json::to_string_pretty(&cfg)?);
                }
                Ok(cfg) => {
                    println!("Configuration is valid!");
                    println!("  MIDI channel: {}", cfg.midi.channel);
                    println!(
                        "  MIDI port: {}",
                        cfg.midi.port.as_deref().unwrap_or("(choose at startup)")
                    );
                    println!("  Dead zone: {}", cfg.filter.dead_zone);
                    println!("  Change threshold: {}", cfg.filter.change_threshold());
                    println!("  Sensitivity: {}", cfg.sensitivity.initial);
                    println!("  Tick interval: {} ms", cfg.tick_interval_ms);
                    println!("  Pairs: {}", cfg.pairs.len());
                    for pair in &cfg.pairs {
                        println!(
                            "    - {} ({:?}) axes {}/{} -> CC {}/{}",
                            pair.name,
                            pair.kind,
                            pair.x.channel,
                            pair.y.channel,
                            pair.x.controller,
                            pair.y.controller
                        );
                    }
                    println!("  Buttons: {}", cfg.buttons.len());
                    for (button, note) in &cfg.buttons {
                        println!("    - button {} -> note {}", button, note);
                    }
                    println!("  Mode switch: button {}", cfg.mode_switch_button);
                }
                Err(e) => {
                    println!("Configuration is invalid: {}", e);
                    std::process::exit(1);
                }
            }
        }

        Commands::Init => {
            let example_config = include_str!("../padmidi.example.yaml");

            let path = "padmidi.yaml";
            if std::path::Path::new(path).exists() {
                println!("padmidi.yaml already exists. Not overwriting.");
            } else {
                std::fs::write(path, example_config)?;
                println!("Created padmidi.yaml with example configuration.");
            }
        }
    }

    Ok(())
}

#[cfg(feature = "gamepad")]
fn port_selector(cfg: &PadConfig) -> engine::PortSelector {
    use engine::PortSelector;

    match (&cfg.midi.port, cfg.midi.auto_select) {
        (Some(name), _) => PortSelector::Named(name.clone()),
        (None, true) => PortSelector::First,
        (None, false) => PortSelector::Interactive,
    }
}

#[cfg(feature = "gamepad")]
fn run(cfg: PadConfig) -> Result<()> {
    use padmidi::engine::{Engine, MidiSink};
    use padmidi::prompt::ConsolePrompt;
    use padmidi::sources::GamepadSource;
    use std::sync::atomic::Ordering;

    let mut engine = Engine::new(&cfg)?;

    let running = engine.running_flag();
    ctrlc::set_handler(move || running.store(false, Ordering::SeqCst))?;

    let mut prompt = ConsolePrompt::stdio(engine.running_flag());
    let mut source = GamepadSource::new()?;
    let device = engine::open_device(&mut source, &cfg)?;
    let mut sink = MidiSink::connect(
        &port_selector(&cfg),
        &mut prompt,
        cfg.midi.channel,
        cfg.midi.velocity,
    )?;
    println!("Connected to MIDI {}\n", sink.port_name());

    println!("Gamepad to MIDI Controller Running...\n");
    println!(
        "Press button {} to adjust joystick sensitivity at any time, Ctrl-C to quit.",
        cfg.mode_switch_button
    );

    let stats = engine.run(&mut source, &device, &mut sink, &mut prompt);
    println!(
        "\nExiting... ({} ticks, {} messages sent)",
        stats.ticks, stats.sent
    );

    Ok(())
}

#[cfg(not(feature = "gamepad"))]
fn run(_cfg: PadConfig) -> Result<()> {
    anyhow::bail!("padmidi was built without gamepad support (enable the `gamepad` feature)")
}

#[cfg(feature = "gamepad")]
fn list_devices() -> Result<()> {
    use padmidi::sources::{GamepadSource, InputSource};

    let mut source = GamepadSource::new()?;
    let devices = source.enumerate_devices()?;

    if devices.is_empty() {
        println!("No gamepads detected.");
        return Ok(());
    }

    println!("Connected gamepads:");
    for device in &devices {
        print!("  {}: {}", device.index, device.name);
        if source.open(device).is_ok() {
            let axes = source.axis_count(device).unwrap_or(0);
            let buttons = source.button_count(device).unwrap_or(0);
            print!(" ({} axes, {} buttons)", axes, buttons);
            source.release(device);
        }
        println!();
    }

    Ok(())
}

#[cfg(not(feature = "gamepad"))]
fn list_devices() -> Result<()> {
    anyhow::bail!("padmidi was built without gamepad support (enable the `gamepad` feature)")
}
