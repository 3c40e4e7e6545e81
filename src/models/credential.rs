use crate::error::{Result, RotateError};
use std::path::PathBuf;
use zeroize::Zeroizing;

/// The live secret of a credential file plus the comment lines above it.
#[derive(Debug, Clone)]
pub struct Credential {
    pub path: PathBuf,
    /// Leading `#` lines, kept verbatim and in order.
    pub preamble: Vec<String>,
    /// First non-comment line, trimmed. `None` when the file holds only comments.
    pub secret: Option<Zeroizing<String>>,
}

impl Credential {
    /// The secret, or `MissingSecret` when the file had no secret line.
    pub fn secret(&self) -> Result<&str> {
        self.secret
            .as_deref()
            .map(String::as_str)
            .ok_or_else(|| RotateError::MissingSecret(self.path.clone()))
    }

    /// Replace the secret after the remote side confirmed it.
    pub fn set_secret(&mut self, secret: Zeroizing<String>) {
        self.secret = Some(secret);
    }
}
