//! Loading, overriding, and validating `passrotate.toml`.

use crate::core::secret::DigitPolicyGenerator;
use crate::core::session::SessionOptions;
use crate::error::{Result, RotateError};
use crate::models::account::Account;
use crate::models::config::RotateConfig;
use std::fs;
use std::path::Path;
use std::time::Duration;

/// Command-line values that win over the file.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub user: Option<String>,
    pub length: Option<usize>,
    pub timeout_secs: Option<u64>,
    pub strict_replies: bool,
}

/// A missing file yields the defaults.
pub fn load(path: &Path) -> Result<RotateConfig> {
    if !path.exists() {
        tracing::debug!(path = %path.display(), "no config file, using defaults");
        return Ok(RotateConfig::default());
    }
    let content = fs::read_to_string(path)
        .map_err(|e| RotateError::io(format!("read config {}", path.display()), e))?;
    toml::from_str(&content).map_err(|e| {
        RotateError::Configuration(format!("parse config {}: {}", path.display(), e))
    })
}

pub fn apply(config: &mut RotateConfig, overrides: Overrides) {
    if let Some(host) = overrides.host {
        config.account.host = Some(host);
    }
    if let Some(port) = overrides.port {
        config.account.port = port;
    }
    if let Some(user) = overrides.user {
        config.account.user = Some(user);
    }
    if let Some(length) = overrides.length {
        config.secret.length = length;
    }
    if let Some(timeout) = overrides.timeout_secs {
        config.session.timeout_secs = timeout;
    }
    if overrides.strict_replies {
        config.session.strict_replies = true;
    }
}

/// Everything a rotation needs, checked before touching files or the network.
pub fn validate(config: &RotateConfig) -> Result<()> {
    account(config)?;
    generator(config)?;
    session_options(config)?;
    Ok(())
}

pub fn account(config: &RotateConfig) -> Result<Account> {
    let host = config
        .account
        .host
        .as_deref()
        .map(str::trim)
        .filter(|h| !h.is_empty())
        .ok_or_else(|| RotateError::Configuration("account host is not set".into()))?;
    let user = config
        .account
        .user
        .as_deref()
        .map(str::trim)
        .filter(|u| !u.is_empty())
        .ok_or_else(|| RotateError::Configuration("account user is not set".into()))?;
    if config.account.port == 0 {
        return Err(RotateError::Configuration("account port must be non-zero".into()));
    }
    Ok(Account::new(host, user).with_port(config.account.port))
}

pub fn generator(config: &RotateConfig) -> Result<DigitPolicyGenerator> {
    DigitPolicyGenerator::new(&config.secret.alphabet, config.secret.length)
}

pub fn session_options(config: &RotateConfig) -> Result<SessionOptions> {
    if config.session.timeout_secs == 0 {
        return Err(RotateError::Configuration(
            "session timeout must be at least 1 second".into(),
        ));
    }
    Ok(SessionOptions {
        timeout: Duration::from_secs(config.session.timeout_secs),
        strict_replies: config.session.strict_replies,
    })
}
