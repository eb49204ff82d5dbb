use std::fs;
use std::path::{Path, PathBuf};

use crate::codec::{CodecError, TzMap};
use crate::model::config::CalendarConfig;

/// Error type for loading the configuration file
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("could not read {path}: {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not parse config: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("bad timezone offset in config: {0}")]
    Offset(#[from] CodecError),
}

/// Read a `vtodo.toml` file
pub fn read_config(path: &Path) -> Result<CalendarConfig, ConfigError> {
    let text = fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
        path: path.to_path_buf(),
        source: e,
    })?;
    let config: CalendarConfig = toml::from_str(&text)?;
    tracing::debug!(
        path = %path.display(),
        timezones = config.timezones.len(),
        "loaded config"
    );
    Ok(config)
}

/// Load the config at `path`, or the defaults when no path is given.
/// Returns the config together with its resolved timezone map.
pub fn load(path: Option<&Path>) -> Result<(CalendarConfig, TzMap), ConfigError> {
    let config = match path {
        Some(path) => read_config(path)?,
        None => CalendarConfig::default(),
    };
    let tz = config.timezone_map()?;
    Ok((config, tz))
}
