//! Append-only JSON-lines record of rotation attempts. Never contains secrets.

use crate::constants;
use crate::error::{Result, RotateError};
use crate::util::fs as rotate_fs;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs::{self, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    /// Remote change confirmed and local store updated.
    Rotated,
    /// Nothing changed remotely.
    Failed,
    /// Remote change confirmed, local store NOT updated.
    Unsaved,
}

impl std::fmt::Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Outcome::Rotated => "rotated",
            Outcome::Failed => "failed",
            Outcome::Unsaved => "unsaved",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub timestamp: DateTime<Utc>,
    pub actor: String,
    pub host: String,
    pub user: String,
    pub outcome: Outcome,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

impl HistoryEntry {
    pub fn new(host: &str, user: &str, outcome: Outcome) -> Self {
        Self {
            timestamp: Utc::now(),
            actor: detect_actor(),
            host: host.to_string(),
            user: user.to_string(),
            outcome,
            error: None,
            warning: None,
        }
    }
}

fn detect_actor() -> String {
    if let Ok(user) = std::env::var("SUDO_USER") {
        if !user.is_empty() {
            return format!("{}(sudo)", user);
        }
    }
    std::env::var("USER").unwrap_or_else(|_| "unknown".to_string())
}

#[derive(Debug, Clone)]
pub struct History {
    path: PathBuf,
}

impl History {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn append(&self, entry: &HistoryEntry) -> Result<()> {
        let line = serde_json::to_string(entry).map_err(|e| {
            RotateError::io(
                "serialize history entry",
                std::io::Error::new(std::io::ErrorKind::InvalidData, e),
            )
        })?;
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| RotateError::io(format!("open history {}", self.path.display()), e))?;
        writeln!(file, "{}", line).map_err(|e| RotateError::io("write history entry", e))?;

        rotate_fs::set_mode(&self.path, constants::STORE_FILE_MODE)
            .map_err(|e| RotateError::io("set history permissions", e))?;
        Ok(())
    }

    /// Entries oldest first; `limit` keeps only the newest ones.
    pub fn read(&self, limit: Option<usize>) -> Result<Vec<HistoryEntry>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let file = fs::File::open(&self.path)
            .map_err(|e| RotateError::io(format!("open history {}", self.path.display()), e))?;
        let mut entries = Vec::new();
        let mut malformed = 0usize;
        for line in BufReader::new(file).lines() {
            let line = line.map_err(|e| RotateError::io("read history line", e))?;
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }
            match serde_json::from_str::<HistoryEntry>(trimmed) {
                Ok(entry) => entries.push(entry),
                Err(_) => malformed += 1,
            }
        }
        if malformed > 0 {
            tracing::warn!(malformed, path = %self.path.display(), "skipped malformed history entries");
        }
        if let Some(limit) = limit {
            if entries.len() > limit {
                entries = entries.split_off(entries.len() - limit);
            }
        }
        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_append_and_read() {
        let dir = TempDir::new().unwrap();
        let history = History::new(dir.path().join("password.txt.history"));
        let mut entry = HistoryEntry::new("ftp.example.org", "edm1", Outcome::Failed);
        entry.error = Some("protocol error: connection closed".into());
        history.append(&entry).unwrap();
        history
            .append(&HistoryEntry::new("ftp.example.org", "edm1", Outcome::Rotated))
            .unwrap();

        let entries = history.read(None).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].outcome, Outcome::Failed);
        assert_eq!(entries[1].outcome, Outcome::Rotated);
        assert!(entries[1].error.is_none());
    }

    #[test]
    fn test_read_limit_keeps_newest() {
        let dir = TempDir::new().unwrap();
        let history = History::new(dir.path().join("h"));
        for outcome in [Outcome::Failed, Outcome::Unsaved, Outcome::Rotated] {
            history
                .append(&HistoryEntry::new("h", "u", outcome))
                .unwrap();
        }
        let entries = history.read(Some(2)).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].outcome, Outcome::Unsaved);
    }

    #[test]
    fn test_read_missing_is_empty() {
        let dir = TempDir::new().unwrap();
        let history = History::new(dir.path().join("none"));
        assert!(history.read(None).unwrap().is_empty());
    }

    #[test]
    fn test_malformed_lines_skipped() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("h");
        fs::write(
            &path,
            "not json\n{\"timestamp\":\"2025-01-01T00:00:00Z\",\"actor\":\"a\",\"host\":\"h\",\"user\":\"u\",\"outcome\":\"rotated\"}\n",
        )
        .unwrap();
        let entries = History::new(path).read(None).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].outcome.to_string(), "rotated");
    }
}
