//! `passrotate.toml` model.

use crate::constants;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RotateConfig {
    #[serde(default)]
    pub account: AccountSection,
    #[serde(default)]
    pub store: StoreSection,
    #[serde(default)]
    pub secret: SecretSection,
    #[serde(default)]
    pub session: SessionSection,
    #[serde(default)]
    pub history: HistorySection,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountSection {
    #[serde(default)]
    pub host: Option<String>,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default)]
    pub user: Option<String>,
}

impl Default for AccountSection {
    fn default() -> Self {
        Self {
            host: None,
            port: default_port(),
            user: None,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoreSection {
    /// Credential file path (default: `password.txt`).
    #[serde(default)]
    pub path: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecretSection {
    #[serde(default = "default_length")]
    pub length: usize,
    #[serde(default = "default_alphabet")]
    pub alphabet: String,
}

impl Default for SecretSection {
    fn default() -> Self {
        Self {
            length: default_length(),
            alphabet: default_alphabet(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSection {
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
    /// Fail on reply codes outside the expected class instead of warning.
    #[serde(default)]
    pub strict_replies: bool,
}

impl Default for SessionSection {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout(),
            strict_replies: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistorySection {
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// History log path (default: store path + `.history`).
    #[serde(default)]
    pub path: Option<String>,
}

impl Default for HistorySection {
    fn default() -> Self {
        Self {
            enabled: true,
            path: None,
        }
    }
}

fn default_port() -> u16 {
    constants::DEFAULT_PORT
}

fn default_length() -> usize {
    constants::DEFAULT_SECRET_LENGTH
}

fn default_alphabet() -> String {
    constants::DEFAULT_ALPHABET.to_string()
}

fn default_timeout() -> u64 {
    constants::DEFAULT_TIMEOUT_SECS
}

fn default_true() -> bool {
    true
}
