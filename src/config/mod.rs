//! Configuration loading and validation

mod schema;

pub use schema::*;

use anyhow::{Context, Result};
use std::path::Path;

/// Load configuration from a YAML file
pub fn load_config(path: &Path) -> Result<PadConfig> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let config: PadConfig = serde_yaml::from_str(&contents)?;
    config.validate()?;
    Ok(config)
}

/// Load `path` if given, otherwise use the built-in defaults
pub fn load_or_default(path: Option<&Path>) -> Result<PadConfig> {
    match path {
        Some(path) => load_config(path),
        None => Ok(PadConfig::default()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapping::ChannelKind;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_load_minimal_config() {
        let yaml = r#"
midi:
  channel: 3

filter:
  dead_zone: 0.05
"#;
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(yaml.as_bytes()).unwrap();

        let config = load_config(file.path()).unwrap();
        assert_eq!(config.midi.channel, 3);
        assert_eq!(config.midi.velocity, 127);
        assert_eq!(config.filter.dead_zone, 0.05);
        assert_eq!(config.filter.change_threshold(), 0.05);
        assert_eq!(config.pairs.len(), 3);
    }

    #[test]
    fn test_load_custom_bindings() {
        let yaml = r#"
tick_interval_ms: 20
mode_switch_button: 9
buttons:
  4: 48
  5: 50
pairs:
  - name: left stick
    x: { channel: 0, controller: 20 }
    y: { channel: 1, controller: 21, invert: true }
  - name: pedals
    kind: unidirectional
    x: { channel: 2, controller: 22 }
    y: { channel: 3, controller: 23 }
"#;
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(yaml.as_bytes()).unwrap();

        let config = load_config(file.path()).unwrap();
        assert_eq!(config.tick_interval_ms, 20);
        assert_eq!(config.mode_switch_button, 9);
        assert_eq!(config.buttons.len(), 2);
        assert_eq!(config.buttons.get(&5), Some(&50));
        assert_eq!(config.pairs[1].kind, ChannelKind::Unidirectional);
        assert!(config.pairs[0].y.invert);
    }

    #[test]
    fn test_load_rejects_invalid() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"tick_interval_ms: 0\n").unwrap();
        assert!(load_config(file.path()).is_err());
    }

    #[test]
    fn test_load_missing_file() {
        assert!(load_config(Path::new("/nonexistent/padmidi.yaml")).is_err());
    }

    #[test]
    fn test_load_or_default() {
        let config = load_or_default(None).unwrap();
        assert_eq!(config.midi.channel, 0);
        assert_eq!(config.sensitivity.initial, 1.0);
    }

    #[test]
    fn test_example_config_matches_defaults() {
        let config: PadConfig =
            serde_yaml::from_str(include_str!("../../padmidi.example.yaml")).unwrap();
        assert!(config.validate().is_ok());

        let defaults = PadConfig::default();
        assert_eq!(config.buttons, defaults.buttons);
        assert_eq!(config.pairs.len(), defaults.pairs.len());
        for (ours, theirs) in config.pairs.iter().zip(&defaults.pairs) {
            assert_eq!(ours.kind, theirs.kind);
            assert_eq!(ours.x.controller, theirs.x.controller);
            assert_eq!(ours.y.controller, theirs.y.controller);
            assert_eq!(ours.y.invert, theirs.y.invert);
        }
    }
}
