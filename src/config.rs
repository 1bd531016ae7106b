//! User configuration (`config.toml`).
//!
//! ```toml
//! log_level = "debug"
//!
//! [format]
//! font_family = "Helvetica"
//! font_size = 11
//! ```

use directories::ProjectDirs;
use serde::Deserialize;
use sheetcalc_core::FormatDefaults;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

#[derive(Debug, Default, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Config {
    pub log_level: Option<String>,
    #[serde(default)]
    pub format: FormatSection,
}

#[derive(Debug, Default, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct FormatSection {
    pub font_family: Option<String>,
    pub font_size: Option<u32>,
}

impl Config {
    /// Load an explicit config file, or the user's default one if it exists.
    ///
    /// A missing default file yields the built-in defaults; a missing
    /// explicit file is an error.
    pub fn load(explicit: Option<&Path>) -> Result<Config, ConfigError> {
        match explicit {
            Some(path) => Self::from_file(path),
            None => match default_config_path() {
                Some(path) if path.is_file() => Self::from_file(&path),
                _ => Ok(Config::default()),
            },
        }
    }

    pub fn from_file(path: &Path) -> Result<Config, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn from_toml(content: &str) -> Result<Config, toml::de::Error> {
        toml::from_str(content)
    }

    pub fn format_defaults(&self) -> FormatDefaults {
        let builtin = FormatDefaults::default();
        FormatDefaults {
            font_family: self
                .format
                .font_family
                .clone()
                .unwrap_or(builtin.font_family),
            font_size: self.format.font_size.unwrap_or(builtin.font_size),
        }
    }
}

pub(crate) fn default_config_path() -> Option<PathBuf> {
    let proj = ProjectDirs::from("", "", "sheetcalc")?;
    let mut path = proj.config_dir().to_path_buf();
    path.push("config.toml");
    Some(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_empty_config_uses_builtin_defaults() {
        let config = Config::from_toml("").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.format_defaults(), FormatDefaults::default());
    }

    #[test]
    fn test_full_config() {
        let config = Config::from_toml(
            r#"
log_level = "debug"

[format]
font_family = "Helvetica"
font_size = 11
"#,
        )
        .unwrap();
        assert_eq!(config.log_level.as_deref(), Some("debug"));
        assert_eq!(
            config.format_defaults(),
            FormatDefaults {
                font_family: "Helvetica".to_string(),
                font_size: 11,
            }
        );
    }

    #[test]
    fn test_unknown_keys_are_rejected() {
        assert!(Config::from_toml("colour = \"red\"").is_err());
        assert!(Config::from_toml("[format]\nbold = true").is_err());
    }

    #[test]
    fn test_missing_explicit_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = Config::load(Some(&dir.path().join("nope.toml"))).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn test_load_explicit_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[format]\nfont_size = 9\n").unwrap();
        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.format_defaults().font_size, 9);
        assert_eq!(config.format_defaults().font_family, "Arial");
    }

    #[test]
    fn default_config_path_is_deterministic() {
        // Should never panic and should either be Some(path) or None.
        let _ = default_config_path();
    }
}
