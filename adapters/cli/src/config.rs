use std::{
    fs, io,
    path::{Path, PathBuf},
};

use sentinel_core::{Tuning, TuningError};
use thiserror::Error;

/// Failures raised while loading a tuning override file.
#[derive(Debug, Error)]
pub(crate) enum ConfigError {
    #[error("failed to read tuning file {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse tuning file {path}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("tuning file {path} is invalid")]
    Invalid {
        path: PathBuf,
        #[source]
        source: TuningError,
    },
}

/// Loads tuning from the optional TOML file, falling back to the defaults.
pub(crate) fn load_tuning(path: Option<&Path>) -> Result<Tuning, ConfigError> {
    let Some(path) = path else {
        return Ok(Tuning::default());
    };

    let source = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    parse_tuning(&source, path)
}

fn parse_tuning(source: &str, path: &Path) -> Result<Tuning, ConfigError> {
    let tuning: Tuning = toml::from_str(source).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    tuning.validate().map_err(|source| ConfigError::Invalid {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::info!(path = %path.display(), "loaded tuning overrides");
    Ok(tuning)
}
