//! Layered configuration loading.

use crate::error::ConfigError;
use crate::settings::KilnConfig;
use figment::{
    providers::{Env, Format as _, Json, Serialized},
    Figment,
};
use std::path::Path;

impl KilnConfig {
    /// Load configuration from multiple sources.
    /// Priority: environment variables > config file > defaults
    ///
    /// # Arguments
    ///
    /// * `config_path` - Explicit config file path. When `None`,
    ///   `kiln.config.json` is used if it exists in the current directory.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::NotFound`] when an explicit path doesn't exist,
    /// or [`ConfigError::InvalidValue`] when extraction fails.
    pub fn load(config_path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut figment = Figment::new().merge(Serialized::defaults(Self::default()));

        // Load kiln.config.json if it exists
        let config_file = match config_path {
            Some(path) => {
                if !path.exists() {
                    return Err(ConfigError::NotFound(path.to_path_buf()));
                }
                Some(path.to_path_buf())
            }
            None => {
                let default_path = Path::new("kiln.config.json");
                default_path.exists().then(|| default_path.to_path_buf())
            }
        };

        if let Some(path) = config_file {
            figment = figment.merge(Json::file(path));
        }

        // Merge environment variables; "__" separates nested sections
        // (KILN_DIST_DIR, KILN_STYLES__SRC, KILN_IMAGES__PNG_LEVEL, ...)
        figment = figment.merge(Env::prefixed("KILN_").split("__"));

        figment.extract().map_err(|e| ConfigError::InvalidValue {
            field: "configuration".to_string(),
            value: e.to_string(),
            hint: "Check kiln.config.json syntax and field types".to_string(),
        })
    }
}
