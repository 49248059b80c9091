//! Conversion settings, loaded from RON.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("RON deserialization error: {0}")]
    Ron(#[from] ron::error::SpannedError),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConversionConfig {
    /// Keep `ei{n}` ids unique across a corpus by advancing the offset
    /// after every converted document.
    pub use_global_instance_ids: bool,
    /// Attach covered text and document id to every record.
    pub attach_debug_text: bool,
    /// First event instance offset.
    pub corpus_offset: u32,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            use_global_instance_ids: true,
            attach_debug_text: false,
            corpus_offset: 0,
        }
    }
}

impl ConversionConfig {
    /// Load a config from a RON file.
    pub fn load_from_ron(path: &Path) -> Result<ConversionConfig, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse_ron(&contents)
    }

    /// Parse a config from a RON string. Missing fields take their defaults.
    pub fn parse_ron(input: &str) -> Result<ConversionConfig, ConfigError> {
        Ok(ron::from_str(input)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = ConversionConfig::default();
        assert!(config.use_global_instance_ids);
        assert!(!config.attach_debug_text);
        assert_eq!(config.corpus_offset, 0);
    }

    #[test]
    fn partial_ron_keeps_defaults() {
        let config = ConversionConfig::parse_ron("(attach_debug_text: true)").unwrap();
        assert!(config.attach_debug_text);
        assert!(config.use_global_instance_ids);
    }

    #[test]
    fn full_ron() {
        let input = "(use_global_instance_ids: false, attach_debug_text: false, corpus_offset: 40)";
        let config = ConversionConfig::parse_ron(input).unwrap();
        assert!(!config.use_global_instance_ids);
        assert_eq!(config.corpus_offset, 40);
    }

    #[test]
    fn ron_round_trip() {
        let config = ConversionConfig {
            use_global_instance_ids: false,
            attach_debug_text: true,
            corpus_offset: 7,
        };
        let serialized = ron::to_string(&config).unwrap();
        assert_eq!(ConversionConfig::parse_ron(&serialized).unwrap(), config);
    }

    #[test]
    fn bad_ron_is_an_error() {
        assert!(matches!(
            ConversionConfig::parse_ron("(corpus_offset: \"x\")"),
            Err(ConfigError::Ron(_))
        ));
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = ConversionConfig::load_from_ron(Path::new("tests/fixtures/missing.ron")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
