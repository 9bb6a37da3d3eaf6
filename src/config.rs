//! User configuration.
//!
//! ```toml
//! format = true
//!
//! [templates]
//! short = "func (x {{ ReceiverType }}) {{ Name }}() {}"
//!
//! [templates.long]
//! path = "long.tmpl"   # relative to this file
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::debug;

use crate::error::ConfigError;

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV: &str = "SKELGEN_CONFIG";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum TemplateSource {
    Inline(String),
    File { path: PathBuf },
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Reformat generated output even without `-f`.
    pub format: bool,
    pub templates: BTreeMap<String, TemplateSource>,
    /// Directory `File` template paths are resolved against.
    #[serde(skip)]
    base_dir: Option<PathBuf>,
}

impl Config {
    /// `<config dir>/skelgen/config.toml`, when the platform has a config dir.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("skelgen").join("config.toml"))
    }

    /// Loads `explicit` if given (it must exist), else the default path if it
    /// exists, else an empty config.
    pub fn discover(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = explicit {
            return Self::load(path);
        }
        match Self::default_path() {
            Some(path) if path.is_file() => Self::load(&path),
            _ => {
                debug!("no config file found; using defaults");
                Ok(Self::default())
            }
        }
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config: Config = toml::from_str(&text).map_err(|source| ConfigError::Toml {
            path: path.to_path_buf(),
            source,
        })?;
        config.base_dir = path.parent().map(Path::to_path_buf);
        debug!(path = %path.display(), templates = config.templates.len(), "loaded config");
        Ok(config)
    }

    /// Parses config text; relative template paths resolve against the
    /// current directory.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        toml::from_str(text).map_err(|source| ConfigError::Toml {
            path: PathBuf::from("<inline>"),
            source,
        })
    }

    /// Template texts keyed by name, reading `File` entries from disk.
    pub fn load_templates(&self) -> Result<Vec<(String, String)>, ConfigError> {
        self.templates
            .iter()
            .map(|(name, source)| match source {
                TemplateSource::Inline(text) => Ok((name.clone(), text.clone())),
                TemplateSource::File { path } => {
                    let path = match &self.base_dir {
                        Some(dir) if path.is_relative() => dir.join(path),
                        _ => path.clone(),
                    };
                    fs::read_to_string(&path)
                        .map(|text| (name.clone(), text))
                        .map_err(|source| ConfigError::TemplateFile {
                            name: name.clone(),
                            path,
                            source,
                        })
                }
            })
            .collect()
    }
}
