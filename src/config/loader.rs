use std::{
    collections::HashMap,
    env, fs,
    path::{Path, PathBuf},
};

use super::scan_config::{PartialScanConfig, ScanConfig};
use crate::errors::ConfigError;

/// Default location of the scan settings file
pub const USER_CONFIG_PATH: &str = "~/.config/di-scan/config.toml";

/// Prefix of the environment variables read by the loader
pub const ENV_PREFIX: &str = "DI_SCAN_";

/// Configuration loader responsible for loading scan settings from a file and
/// the environment
#[derive(Debug, Default)]
pub struct ConfigLoader {
    path: Option<PathBuf>,
    env: Option<HashMap<String, String>>,
}

impl ConfigLoader {
    /// Create a new config loader using the default path and the process environment
    pub fn new() -> Self {
        Self::default()
    }

    /// Read settings from `path` instead of the default location.
    /// A leading `~` is expanded.
    pub fn with_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Use a fixed environment map instead of the process environment (for testing)
    pub fn with_env(mut self, env: HashMap<String, String>) -> Self {
        self.env = Some(env);
        self
    }

    /// Load scan settings.
    ///
    /// An explicitly given file must exist; the default file is optional.
    pub fn load(&self) -> Result<ScanConfig, ConfigError> {
        let partial = match &self.path {
            Some(path) => Some(self.load_partial_config(&expand_path(path))?),
            None => {
                let default_path = expand_path(Path::new(USER_CONFIG_PATH));
                if default_path.exists() {
                    Some(self.load_partial_config(&default_path)?)
                } else {
                    tracing::debug!(path = %default_path.display(), "No scan settings file, using defaults");
                    None
                }
            }
        };

        let env_map = self.collect_env_vars();
        ScanConfig::from_partial_and_env(partial, &env_map)
    }

    fn load_partial_config(&self, path: &Path) -> Result<PartialScanConfig, ConfigError> {
        let path_display = path.display().to_string();
        let content =
            fs::read_to_string(path).map_err(|e| ConfigError::FileRead(path_display.clone(), e))?;
        let partial =
            toml::from_str(&content).map_err(|e| ConfigError::TomlParse(path_display.clone(), e))?;
        tracing::debug!(path = %path_display, "Loaded scan settings file");
        Ok(partial)
    }

    fn collect_env_vars(&self) -> HashMap<String, String> {
        match &self.env {
            Some(env) => env.clone(),
            None => env::vars().filter(|(key, _)| key.starts_with(ENV_PREFIX)).collect(),
        }
    }
}

fn expand_path(path: &Path) -> PathBuf {
    let raw = path.to_string_lossy();
    PathBuf::from(shellexpand::tilde(raw.as_ref()).as_ref())
}
