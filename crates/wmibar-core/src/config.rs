//! Startup configuration.
//!
//! Everything here only seeds the namespace; once the bar runs, the global
//! files (`/font`, `/fgcolor`, ...) are the source of truth.

use std::path::Path;

use serde::Deserialize;

use crate::error::{BarError, Result};

/// Bar defaults loaded from an optional TOML file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct BarConfig {
    /// Initial `/font` content.
    pub font: String,
    /// Initial `/fgcolor` content.
    pub fgcolor: String,
    /// Initial `/bgcolor` content.
    pub bgcolor: String,
    /// Initial `/bordercolor` content.
    pub bordercolor: String,
    /// Bar height used when the geometry leaves it at zero.
    pub height: u32,
    /// Shell that runs `b<n>press` commands.
    pub shell: String,
}

impl Default for BarConfig {
    fn default() -> Self {
        Self {
            font: "fixed:8".to_string(),
            fgcolor: "#EEEEEEFF".to_string(),
            bgcolor: "#222222FF".to_string(),
            bordercolor: "#666666FF".to_string(),
            height: 20,
            shell: "/bin/sh".to_string(),
        }
    }
}

impl BarConfig {
    /// Parse a config from TOML text. Missing keys keep their defaults.
    pub fn from_toml(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text)?;
        if config.height == 0 {
            return Err(BarError::Config("height must be positive".to_string()));
        }
        Ok(config)
    }

    /// Read and parse a config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let config = Self::from_toml(&text)
            .map_err(|e| BarError::Config(format!("{}: {e}", path.display())))?;
        log::debug!("loaded config from {}", path.display());
        Ok(config)
    }
}
