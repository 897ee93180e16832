// src/core/config.rs

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const DEFAULT_CONFIG_FILE: &str = "typedmath.toml";
pub const CONFIG_ENV_VAR: &str = "TYPEDMATH_CONFIG";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config parse error: {0}")]
    Parse(#[from] toml::de::Error),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DispatchConfig {
    /// Memoise signature resolution per operand-kind tuple
    pub cache_resolutions: bool,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            cache_resolutions: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoundingConfig {
    /// Largest decimal count accepted for Number and Complex operands
    pub max_number_decimals: u32,
    /// Largest decimal count accepted for Decimal and Rational operands
    pub max_exact_decimals: u32,
}

impl Default for RoundingConfig {
    fn default() -> Self {
        Self {
            max_number_decimals: 15,
            max_exact_decimals: 1000,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub dispatch: DispatchConfig,
    pub rounding: RoundingConfig,
    pub logging: LoggingConfig,
}

impl EngineConfig {
    /// Load from `$TYPEDMATH_CONFIG` or `./typedmath.toml`; defaults when
    /// neither exists or the file is unreadable.
    pub fn load() -> Self {
        let path = std::env::var_os(CONFIG_ENV_VAR)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));
        if !path.exists() {
            return Self::default();
        }
        match Self::from_file(&path) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "ignoring unreadable config");
                Self::default()
            }
        }
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Default configuration as a TOML document
    pub fn default_toml() -> String {
        r#"[dispatch]
cache_resolutions = true

[rounding]
max_number_decimals = 15
max_exact_decimals = 1000

[logging]
level = "warn"
"#
        .to_string()
    }
}
