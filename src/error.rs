//! Error taxonomy for the translation core and its collaborators

use thiserror::Error;

/// Errors raised by input sources, output sinks, prompts and the translator
#[derive(Debug, Error)]
pub enum Error {
    /// No game controller was found at startup
    #[error("no gamepad detected, connect one and restart")]
    NoDeviceFound,

    /// The input backend could not be started
    #[error("failed to initialize input backend: {0}")]
    BackendInit(String),

    /// No MIDI output port is available at startup
    #[error("no MIDI output ports found, start a virtual MIDI port and restart")]
    NoOutputTargetFound,

    /// A named MIDI output port does not exist
    #[error("MIDI port '{0}' not found")]
    PortNotFound(String),

    /// The adjustment prompt got something that is not a sensitivity in [0, 1]
    #[error("invalid sensitivity '{0}', expected a number between 0 and 1")]
    InvalidSensitivityInput(String),

    /// The device could not be read (usually unplugged mid-run)
    #[error("device read failed: {0}")]
    DeviceReadFailure(String),

    /// A message could not be delivered to the output
    #[error("MIDI output failed: {0}")]
    OutputFailure(String),

    /// The prompt's input stream ended or was cancelled
    #[error("prompt closed")]
    PromptClosed,
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_startup_errors_name_their_cause() {
        let init = Error::BackendInit("SDL_Init failed".to_string());
        assert_eq!(
            init.to_string(),
            "failed to initialize input backend: SDL_Init failed"
        );
        assert!(!init.to_string().contains("device read failed"));
        assert!(Error::NoDeviceFound.to_string().contains("no gamepad"));
    }
}
