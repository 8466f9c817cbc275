//! Assistant configuration
//!
//! A single JSON document holding the lexicon and the dispatch settings. Every field is
//! optional; anything left out keeps the built-in default.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::dispatch::DispatchConfig;
use crate::error::{Error, Result};
use crate::lexicon::Lexicon;

const CONFIG_DIR_NAME: &str = "voice-intent";
const CONFIG_FILE_NAME: &str = "config.json";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub lexicon: Lexicon,
    pub dispatch: DispatchConfig,
}

impl Config {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        let config = Self::from_json(&json)?;
        info!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Default location: `<config dir>/voice-intent/config.json`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
    }

    /// Load from an explicit path, or from the default location when it exists.
    ///
    /// An explicit path that cannot be read is an error; a missing default file is not.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        if let Some(path) = path {
            if !path.exists() {
                return Err(Error::Config(format!(
                    "config file not found: {}",
                    path.display()
                )));
            }
            return Self::from_path(path);
        }

        match Self::default_path() {
            Some(path) if path.exists() => Self::from_path(&path),
            _ => {
                debug!("No config file found, using defaults");
                Ok(Self::default())
            }
        }
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
