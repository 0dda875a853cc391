// src/config/loader.rs

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::config::model::{ConfigFile, RawConfigFile};
use crate::errors::Result;

/// Parse a config file into its raw, unvalidated form.
///
/// Durations stay strings and ranges are unchecked; see [`load_and_validate`].
pub fn load_from_path(path: impl AsRef<Path>) -> Result<RawConfigFile> {
    let contents = fs::read_to_string(path.as_ref())?;
    Ok(toml::from_str(&contents)?)
}

/// Read, apply defaults, parse durations and check ranges.
pub fn load_and_validate(path: impl AsRef<Path>) -> Result<ConfigFile> {
    ConfigFile::try_from(load_from_path(path)?)
}

/// Like [`load_and_validate`], except that a missing file at the
/// [default path](default_config_path) yields the built-in defaults.
///
/// An explicitly given path that does not exist is still an error.
pub fn load_or_default(path: impl AsRef<Path>) -> Result<ConfigFile> {
    let path = path.as_ref();
    if path == default_config_path() && !path.exists() {
        debug!(path = %path.display(), "no config file; using built-in defaults");
        return ConfigFile::try_from(RawConfigFile::default());
    }
    load_and_validate(path)
}

/// `Batchfleet.toml` in the current working directory.
pub fn default_config_path() -> PathBuf {
    PathBuf::from("Batchfleet.toml")
}
