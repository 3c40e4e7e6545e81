//! Path resolution for the config, credential file, lock, and history log.

use crate::constants;
use crate::core::lock::RotationLock;
use crate::models::config::RotateConfig;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct RotatePaths {
    pub config: PathBuf,
    pub store: PathBuf,
    pub lock: PathBuf,
    pub history: PathBuf,
}

impl RotatePaths {
    /// Config path from the CLI (or its env var), else `passrotate.toml`.
    pub fn config_path(arg: Option<PathBuf>) -> PathBuf {
        arg.unwrap_or_else(|| PathBuf::from(constants::DEFAULT_CONFIG_PATH))
    }

    /// Store from the CLI, else `[store] path`, else `password.txt`.
    /// Relative paths in the config file are taken relative to that file.
    pub fn resolve(config_path: PathBuf, store_arg: Option<PathBuf>, config: &RotateConfig) -> Self {
        let base = config_path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map(Path::to_path_buf)
            .unwrap_or_default();
        let store = match (store_arg, &config.store.path) {
            (Some(arg), _) => arg,
            (None, Some(p)) => base.join(p),
            (None, None) => PathBuf::from(constants::DEFAULT_STORE_PATH),
        };
        let history = match &config.history.path {
            Some(p) => base.join(p),
            None => with_suffix(&store, constants::HISTORY_SUFFIX),
        };
        Self {
            lock: RotationLock::path_for(&store),
            config: config_path,
            store,
            history,
        }
    }
}

fn with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(suffix);
    PathBuf::from(name)
}

impl std::fmt::Display for RotatePaths {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "store@{}", self.store.display())
    }
}
