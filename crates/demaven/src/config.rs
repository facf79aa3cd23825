//! Tool configuration.
//!
//! Read from a TOML file with four keys:
//!
//! ```toml
//! maven_url = "https://repo1.maven.org/maven2/"
//! libraries_dir = "${config.dir}/libraries"
//! mappings_file = "mappings.toml"
//! licenses_file = "licenses.toml"
//! ```
//!
//! Each key can be overridden by a `DEMAVEN_<KEY>` environment variable.
//! Values are templates: `${config.dir}` is the directory holding the file
//! and any other reference falls back to the environment. Relative paths,
//! and a `maven_url` that is not a URL, resolve against the config directory.

use crate::error::{DemavenError, Result};
use demaven_core::{CoreError, MissingPolicy, PropertyContext, Template, Url};
use std::path::{Path, PathBuf};
use toml_edit::DocumentMut;

pub const DEFAULT_CONFIG_FILE: &str = "demaven.toml";

const MAVEN_URL: &str = "maven_url";
const LIBRARIES_DIR: &str = "libraries_dir";
const MAPPINGS_FILE: &str = "mappings_file";
const LICENSES_FILE: &str = "licenses_file";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub maven_url: Url,
    pub libraries_dir: PathBuf,
    pub mappings_file: PathBuf,
    pub licenses_file: PathBuf,
}

impl Config {
    /// Loads the configuration, using the process environment for
    /// overrides.
    ///
    /// Without an explicit `path`, a missing `demaven.toml` in the current
    /// directory is not an error as long as the environment supplies every
    /// key.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let env = |key: &str| std::env::var(key).ok();
        let (file, required) = match path {
            Some(path) => (path.to_path_buf(), true),
            None => (PathBuf::from(DEFAULT_CONFIG_FILE), false),
        };

        let content = if file.is_file() || required {
            tracing::info!("Loading configuration from {}", file.display());
            std::fs::read_to_string(&file).map_err(|e| DemavenError::Io {
                path: file.clone(),
                source: e,
            })?
        } else {
            tracing::debug!("No {} found, using environment only", file.display());
            String::new()
        };

        Self::from_toml(&content, &file, env)
    }

    /// Parses configuration text read from `file`.
    ///
    /// `env` looks up the `DEMAVEN_*` overrides.
    pub fn from_toml(content: &str, file: &Path, env: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let location = file.display().to_string();
        let config_error = |message: String| CoreError::Config {
            location: location.clone(),
            message,
        };

        let doc: DocumentMut = content
            .parse()
            .map_err(|e: toml_edit::TomlError| config_error(e.to_string()))?;

        let base = match file.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        let mut properties = PropertyContext::new();
        properties.insert("config.dir", base.display().to_string());

        let value = |key: &str| -> Result<String> {
            let override_key = format!("DEMAVEN_{}", key.to_uppercase());
            let raw = match env(&override_key) {
                Some(raw) => raw,
                None => match doc.get(key) {
                    Some(item) => item
                        .as_str()
                        .ok_or_else(|| config_error(format!("'{key}' is not a string")))?
                        .to_string(),
                    None => {
                        return Err(config_error(format!(
                            "'{key}' not set (nor {override_key})"
                        ))
                        .into());
                    }
                },
            };
            let evaluated = Template::resolve(&raw, &location, &properties, MissingPolicy::Fail)?;
            Ok(evaluated.unwrap_or_default().trim().to_string())
        };
        let path = |key: &str| -> Result<PathBuf> {
            let path = PathBuf::from(value(key)?);
            Ok(if path.is_absolute() { path } else { base.join(path) })
        };

        let maven_url = value(MAVEN_URL)?;
        let maven_url = match Url::parse(&maven_url) {
            Ok(url) => url,
            Err(_) => {
                let dir = PathBuf::from(&maven_url);
                let dir = if dir.is_absolute() { dir } else { base.join(dir) };
                let dir = std::path::absolute(&dir).map_err(|e| DemavenError::Io {
                    path: dir.clone(),
                    source: e,
                })?;
                Url::from_directory_path(&dir).map_err(|()| CoreError::InvalidUrl {
                    url: maven_url.clone(),
                    message: "neither a URL nor a local directory".into(),
                })?
            }
        };

        Ok(Self {
            maven_url,
            libraries_dir: path(LIBRARIES_DIR)?,
            mappings_file: path(MAPPINGS_FILE)?,
            licenses_file: path(LICENSES_FILE)?,
        })
    }
}
