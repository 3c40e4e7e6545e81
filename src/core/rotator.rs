//! One rotation: load, generate, change remotely, then persist.
//!
//! The new secret is only written after the server confirmed the change. A
//! failed write after that point is reported as `Unsaved`, carrying the new
//! secret so the operator can recover it.

use crate::core::credstore::CredentialStore;
use crate::core::history::{History, HistoryEntry, Outcome};
use crate::core::lock::RotationLock;
use crate::core::secret::SecretSource;
use crate::core::session::{ProtocolClient, SessionReport};
use crate::error::{PendingSecret, Result, RotateError};
use std::net::SocketAddr;
use zeroize::Zeroizing;

pub struct Rotator {
    store: CredentialStore,
    source: Box<dyn SecretSource>,
    client: ProtocolClient,
    history: Option<History>,
}

/// What a dry run checked.
#[derive(Debug, Clone)]
pub struct DryRun {
    pub comment_lines: usize,
    pub secret_length: usize,
    pub candidate_length: usize,
    pub addrs: Vec<SocketAddr>,
}

impl Rotator {
    pub fn new(store: CredentialStore, source: Box<dyn SecretSource>, client: ProtocolClient) -> Self {
        Self {
            store,
            source,
            client,
            history: None,
        }
    }

    pub fn with_history(mut self, history: History) -> Self {
        self.history = Some(history);
        self
    }

    pub fn rotate(&self) -> Result<SessionReport> {
        let _lock = RotationLock::acquire(self.store.path())?;
        let result = self.run();
        self.record(&result);
        result
    }

    fn run(&self) -> Result<SessionReport> {
        let mut credential = self.store.load()?;
        let current = Zeroizing::new(credential.secret()?.to_string());
        let candidate = self.source.generate();
        tracing::info!(account = %self.client.account(), "changing remote password");

        let report = self.client.rotate(&current, &candidate)?;

        if let Err(e) = self.store.resave(&credential, &candidate) {
            tracing::error!(error = %e, "remote password changed but local save failed");
            return Err(RotateError::Unsaved {
                path: self.store.path().to_path_buf(),
                new_secret: PendingSecret::new(candidate),
                source: Box::new(e),
            });
        }
        credential.set_secret(candidate);
        tracing::info!(path = %self.store.path().display(), "credential file updated");
        Ok(report)
    }

    /// Everything except the session and the save.
    pub fn dry_run(&self) -> Result<DryRun> {
        let credential = self.store.load()?;
        let secret_length = credential.secret()?.chars().count();
        let candidate = self.source.generate();
        let addrs = self.client.resolve()?;
        Ok(DryRun {
            comment_lines: credential.preamble.len(),
            secret_length,
            candidate_length: candidate.chars().count(),
            addrs,
        })
    }

    fn record(&self, result: &Result<SessionReport>) {
        let Some(history) = &self.history else {
            return;
        };
        let account = self.client.account();
        let entry = match result {
            Ok(report) => {
                let mut entry = HistoryEntry::new(&account.host, &account.user, Outcome::Rotated);
                entry.warning = report.quit_warning.clone();
                entry
            }
            Err(e) => {
                let outcome = match e {
                    RotateError::Unsaved { .. } => Outcome::Unsaved,
                    _ => Outcome::Failed,
                };
                let mut entry = HistoryEntry::new(&account.host, &account.user, outcome);
                entry.error = Some(e.to_string());
                entry
            }
        };
        if let Err(e) = history.append(&entry) {
            tracing::warn!(error = %e, "history append failed");
        }
    }
}
