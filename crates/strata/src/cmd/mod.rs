//! Command implementations for the Strata CLI

pub mod ingest;
pub mod query;

use std::path::Path;

use anyhow::{Context, Result, bail};
use strata_config::Config;

/// Searched in order when no `--config` is given
const DEFAULT_CONFIG_PATHS: &[&str] = &["configs/strata.toml", "strata.toml"];

/// Load the config file
///
/// An explicit path must exist. Without one the default paths are tried,
/// then built-in defaults are used.
pub fn load_config(path: Option<&Path>) -> Result<Config> {
    if let Some(path) = path {
        if !path.exists() {
            bail!("config file not found: {}", path.display());
        }
        return Config::from_file(path)
            .with_context(|| format!("failed to load config: {}", path.display()));
    }

    for candidate in DEFAULT_CONFIG_PATHS {
        let candidate = Path::new(candidate);
        if candidate.exists() {
            return Config::from_file(candidate)
                .with_context(|| format!("failed to load config: {}", candidate.display()));
        }
    }

    Ok(Config::default())
}
