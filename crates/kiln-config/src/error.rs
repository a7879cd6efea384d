//! Configuration errors.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while loading or validating a kiln configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Config file doesn't exist at the expected location
    #[error("Config file not found: {}\n\nHint: Create a kiln.config.json file or pass --config <path>", .0.display())]
    NotFound(PathBuf),

    /// Invalid value for a configuration option
    #[error("Invalid value for '{field}': {value}\n\nHint: {hint}")]
    InvalidValue {
        /// Name of the field with invalid value
        field: String,
        /// The invalid value
        value: String,
        /// Helpful hint for correct values
        hint: String,
    },

    /// Missing required configuration field
    #[error("Missing required field: {field}\n\nHint: {hint}")]
    MissingField {
        /// Name of the missing field
        field: String,
        /// Helpful hint for providing the field
        hint: String,
    },

    /// I/O error while reading config
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_message() {
        let err = ConfigError::NotFound(PathBuf::from("kiln.config.json"));
        let msg = err.to_string();
        assert!(msg.contains("Config file not found"));
        assert!(msg.contains("kiln.config.json"));
        assert!(msg.contains("Hint:"));
    }

    #[test]
    fn test_invalid_value_message() {
        let err = ConfigError::InvalidValue {
            field: "images.png_level".to_string(),
            value: "11".to_string(),
            hint: "Must be between 0 and 6".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("Invalid value for 'images.png_level'"));
        assert!(msg.contains("11"));
        assert!(msg.contains("Must be between 0 and 6"));
    }
}
