use crate::constants;
use serde::{Deserialize, Serialize};

/// Remote account whose password is rotated. Read-only per session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    pub user: String,
}

impl Account {
    pub fn new(host: impl Into<String>, user: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port: constants::DEFAULT_PORT,
            user: user.into(),
        }
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }
}

impl std::fmt::Display for Account {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}@{}:{}", self.user, self.host, self.port)
    }
}

fn default_port() -> u16 {
    constants::DEFAULT_PORT
}
