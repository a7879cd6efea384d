//! Configuration validation.

use crate::error::ConfigError;
use crate::settings::KilnConfig;

impl KilnConfig {
    /// Validate configuration for logical consistency.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when bundle names are empty or contain path
    /// separators, when option ranges are exceeded, or when a task's source
    /// and destination directories collide.
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_bundle_name("styles.bundle", &self.styles.bundle)?;
        validate_bundle_name("scripts.bundle", &self.scripts.bundle)?;

        if self.images.png_level > 6 {
            return Err(ConfigError::InvalidValue {
                field: "images.png_level".to_string(),
                value: self.images.png_level.to_string(),
                hint: "PNG optimization level must be between 0 and 6".to_string(),
            });
        }

        if self.images.jpeg_quality == 0 || self.images.jpeg_quality > 100 {
            return Err(ConfigError::InvalidValue {
                field: "images.jpeg_quality".to_string(),
                value: self.images.jpeg_quality.to_string(),
                hint: "JPEG quality must be between 1 and 100".to_string(),
            });
        }

        // A task writing into its own source tree would re-trigger itself
        // forever under watch and defeat the changed-file filter.
        if self.images.src == self.images.out {
            return Err(ConfigError::InvalidValue {
                field: "images.out".to_string(),
                value: self.images.out.display().to_string(),
                hint: "Image source and destination directories must differ".to_string(),
            });
        }
        if self.styles.src == self.styles.out {
            return Err(ConfigError::InvalidValue {
                field: "styles.out".to_string(),
                value: self.styles.out.display().to_string(),
                hint: "Style source and output directories must differ".to_string(),
            });
        }
        if self.dist_dir == self.base_dir {
            return Err(ConfigError::InvalidValue {
                field: "dist_dir".to_string(),
                value: self.dist_dir.display().to_string(),
                hint: "The dist directory cannot be the base directory itself".to_string(),
            });
        }

        Ok(())
    }
}

fn validate_bundle_name(field: &str, name: &str) -> Result<(), ConfigError> {
    if name.is_empty() {
        return Err(ConfigError::MissingField {
            field: field.to_string(),
            hint: "Provide an output file name, e.g. \"style.min.css\"".to_string(),
        });
    }
    if name.contains('/') || name.contains('\\') {
        return Err(ConfigError::InvalidValue {
            field: field.to_string(),
            value: name.to_string(),
            hint: "Bundle names are file names, not paths".to_string(),
        });
    }
    Ok(())
}
