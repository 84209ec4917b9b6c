//! User configuration for shaderscope.
//!
//! Loaded from `~/.config/shaderscope/config.toml`. Every key is optional:
//!
//! ```toml
//! log_level = "info"
//!
//! [shader]
//! stages = ["vertex", "fragment"]
//! profile = "450 core"
//! predefined_macros = ["USE_SHADOWS", "MAX_LIGHTS=8"]
//!
//! [shader.extensions]
//! glsl = "fragment"
//!
//! [reparse]
//! debounce_ms = 250
//! ```
//!
//! `log_level` is a top-level key, so it has to come before the first table.

use log::LevelFilter;
use serde::{Deserialize, Serialize};
use shaderscope_syntax::{Profile, ShaderType};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {config_path}: {source}")]
    ConfigReadError {
        config_path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file at {config_path}: {source}")]
    ConfigParseError {
        config_path: PathBuf,
        source: toml::de::Error,
    },

    #[error("Invalid value {value:?} for `{field}`: {reason}")]
    InvalidValue {
        field: &'static str,
        value: String,
        reason: String,
    },
}

/// Stage names for the conventional shader file extensions.
const EXTENSION_STAGES: &[(&str, &str)] = &[
    ("vert", "vertex"),
    ("frag", "fragment"),
    ("geom", "geometry"),
    ("comp", "compute"),
    ("tesc", "tessellation_control"),
    ("tese", "tessellation_evaluation"),
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub log_level: String,
    pub shader: ShaderConfig,
    pub reparse: ReparseConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            shader: ShaderConfig::default(),
            reparse: ReparseConfig::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShaderConfig {
    /// Stage names; empty means every stage.
    pub stages: Vec<String>,
    /// Version and profile used until a `#version` directive overrides it.
    pub profile: String,
    /// `NAME` or `NAME=VALUE`.
    pub predefined_macros: Vec<String>,
    /// Extra extension to stage name mappings, checked before the built-in
    /// ones.
    pub extensions: BTreeMap<String, String>,
}

impl Default for ShaderConfig {
    fn default() -> Self {
        Self {
            stages: Vec::new(),
            profile: Profile::default().to_string(),
            predefined_macros: Vec::new(),
            extensions: BTreeMap::new(),
        }
    }
}

impl ShaderConfig {
    pub fn shader_type(&self) -> Result<ShaderType, ConfigError> {
        if self.stages.is_empty() {
            return Ok(ShaderType::all());
        }
        self.stages.iter().try_fold(ShaderType::empty(), |acc, name| {
            stage_from_name("shader.stages", name).map(|stage| acc | stage)
        })
    }

    pub fn profile(&self) -> Result<Profile, ConfigError> {
        Profile::from_str(&self.profile).map_err(|err| ConfigError::InvalidValue {
            field: "shader.profile",
            value: self.profile.clone(),
            reason: err.to_string(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReparseConfig {
    /// Quiet period after the last edit before a reparse starts.
    pub debounce_ms: u64,
}

impl Default for ReparseConfig {
    fn default() -> Self {
        Self { debounce_ms: 250 }
    }
}

impl ReparseConfig {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

fn stage_from_name(field: &'static str, name: &str) -> Result<ShaderType, ConfigError> {
    ShaderType::from_stage_name(name).ok_or_else(|| ConfigError::InvalidValue {
        field,
        value: name.to_string(),
        reason: "not a shader stage".to_string(),
    })
}

impl Config {
    pub fn load_from_path<P: AsRef<Path>>(config_path: P) -> Result<Option<Self>, ConfigError> {
        let config_path = config_path.as_ref();
        if !config_path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(config_path).map_err(|source| {
            ConfigError::ConfigReadError {
                config_path: config_path.to_path_buf(),
                source,
            }
        })?;

        let config: Config =
            toml::from_str(&content).map_err(|source| ConfigError::ConfigParseError {
                config_path: config_path.to_path_buf(),
                source,
            })?;
        config.validate()?;

        Ok(Some(config))
    }

    pub fn load() -> Result<Option<Self>, ConfigError> {
        let config_path = Self::config_path();
        Self::load_from_path(&config_path)
    }

    pub fn save_to_path<P: AsRef<Path>>(&self, config_path: P) -> anyhow::Result<()> {
        let config_path = config_path.as_ref();
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(config_path, content)?;
        Ok(())
    }

    pub fn save(&self) -> anyhow::Result<()> {
        let config_path = Self::config_path();
        self.save_to_path(&config_path)
    }

    pub fn config_path() -> PathBuf {
        let config_dir = shellexpand::tilde("~/.config/shaderscope");
        PathBuf::from(config_dir.as_ref()).join("config.toml")
    }

    /// Checks every value that has a restricted form.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.log_level_filter()?;
        self.shader.shader_type()?;
        self.shader.profile()?;
        for (extension, stage) in &self.shader.extensions {
            stage_from_name("shader.extensions", stage).map_err(|err| match err {
                ConfigError::InvalidValue { field, value, .. } => ConfigError::InvalidValue {
                    field,
                    value,
                    reason: format!("extension .{extension} maps to an unknown stage"),
                },
                other => other,
            })?;
        }
        Ok(())
    }

    pub fn log_level_filter(&self) -> Result<LevelFilter, ConfigError> {
        LevelFilter::from_str(&self.log_level).map_err(|_| ConfigError::InvalidValue {
            field: "log_level",
            value: self.log_level.clone(),
            reason: "expected off, error, warn, info, debug or trace".to_string(),
        })
    }

    /// Stage name for a file extension (with or without the dot).
    pub fn shader_stage_for_extension(&self, extension: &str) -> Option<&str> {
        let extension = extension.trim_start_matches('.');
        if let Some(stage) = self.shader.extensions.get(extension) {
            return Some(stage.as_str());
        }
        EXTENSION_STAGES
            .iter()
            .find(|(ext, _)| ext.eq_ignore_ascii_case(extension))
            .map(|(_, stage)| *stage)
    }

    /// Stages for a shader file: taken from its extension when that is
    /// known, otherwise the configured stages.
    pub fn shader_type_for_path(&self, path: &Path) -> Result<ShaderType, ConfigError> {
        let by_extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .and_then(|ext| self.shader_stage_for_extension(ext));
        match by_extension {
            Some(stage) => stage_from_name("shader.extensions", stage),
            None => self.shader.shader_type(),
        }
    }
}
