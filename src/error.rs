//! Error taxonomy for rotation.
//!
//! Messages never carry secret values.

use std::path::PathBuf;
use zeroize::Zeroizing;

/// The confirmed new password when it could not be written locally.
/// Redacted in `Debug` and `Display`; read with [`PendingSecret::expose`].
pub struct PendingSecret(Zeroizing<String>);

impl PendingSecret {
    pub fn new(secret: Zeroizing<String>) -> Self {
        Self(secret)
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for PendingSecret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("PendingSecret(****)")
    }
}

/// Failure class of a [`RotateError`], the reason tag of a failed rotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    Connection,
    Protocol,
    UnexpectedReply,
    Io,
    Configuration,
    Unsaved,
}

#[derive(Debug, thiserror::Error)]
pub enum RotateError {
    #[error("connection error: {0}")]
    Connection(String),

    #[error("protocol error: {0}")]
    Protocol(String),

    #[error("unexpected reply to {step}: {reply}")]
    UnexpectedReply { step: &'static str, reply: String },

    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("no secret line found in {}", .0.display())]
    MissingSecret(PathBuf),

    #[error("another rotation holds the lock {}", .0.display())]
    Locked(PathBuf),

    #[error(
        "remote password WAS changed but {} was not updated: {source}",
        .path.display()
    )]
    Unsaved {
        path: PathBuf,
        new_secret: PendingSecret,
        #[source]
        source: Box<RotateError>,
    },
}

impl RotateError {
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    pub fn kind(&self) -> FailureKind {
        match self {
            Self::Connection(_) => FailureKind::Connection,
            Self::Protocol(_) => FailureKind::Protocol,
            Self::UnexpectedReply { .. } => FailureKind::UnexpectedReply,
            Self::Io { .. } | Self::MissingSecret(_) => FailureKind::Io,
            Self::Configuration(_) | Self::Locked(_) => FailureKind::Configuration,
            Self::Unsaved { .. } => FailureKind::Unsaved,
        }
    }
}

pub type Result<T, E = RotateError> = std::result::Result<T, E>;
