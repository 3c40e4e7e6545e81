//! Plain-text credential file: leading `#` comment lines, then one secret line.
//!
//! ```text
//! # optional comment line 1
//! # optional comment line 2
//! <secret>
//! ```
//!
//! Anything after the secret line is ignored on load and dropped on save.

use crate::constants;
use crate::error::{Result, RotateError};
use crate::models::credential::Credential;
use crate::util::fs as rotate_fs;
use std::fs::{self, File};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use zeroize::Zeroizing;

#[cfg(unix)]
use std::os::unix::fs::PermissionsExt;

#[derive(Debug, Clone)]
pub struct CredentialStore {
    path: PathBuf,
}

impl CredentialStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the preamble and the first non-comment line. Stops reading at the secret.
    pub fn load(&self) -> Result<Credential> {
        let file = File::open(&self.path).map_err(|e| {
            RotateError::io(format!("open credential file {}", self.path.display()), e)
        })?;
        let mut preamble = Vec::new();
        let mut secret = None;
        for line in BufReader::new(file).lines() {
            let line = line.map_err(|e| {
                RotateError::io(format!("read credential file {}", self.path.display()), e)
            })?;
            if line.starts_with('#') {
                preamble.push(line);
            } else {
                secret = Some(Zeroizing::new(line.trim().to_string()));
                break;
            }
        }
        tracing::debug!(
            path = %self.path.display(),
            comments = preamble.len(),
            has_secret = secret.is_some(),
            "loaded credential file"
        );
        Ok(Credential {
            path: self.path.clone(),
            preamble,
            secret,
        })
    }

    /// Rewrite the file as `preamble` lines followed by `secret`.
    ///
    /// Written to a temp file in the same directory and renamed over the
    /// target, so a failed save leaves the previous contents intact.
    pub fn save(&self, preamble: &[String], secret: &str) -> Result<()> {
        let dir = self
            .path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        let mut tmp = tempfile::Builder::new()
            .prefix(".passrotate-")
            .tempfile_in(dir)
            .map_err(|e| RotateError::io(format!("create temp file in {}", dir.display()), e))?;

        let content = Zeroizing::new(render(preamble, secret));
        tmp.write_all(content.as_bytes())
            .map_err(|e| RotateError::io("write credential temp file", e))?;
        tmp.as_file()
            .sync_all()
            .map_err(|e| RotateError::io("sync credential temp file", e))?;

        #[cfg(unix)]
        {
            let perm = fs::Permissions::from_mode(constants::STORE_FILE_MODE);
            tmp.as_file()
                .set_permissions(perm)
                .map_err(|e| RotateError::io("set permissions on credential temp file", e))?;
        }

        tmp.persist(&self.path).map_err(|err| {
            RotateError::io(format!("replace {}", self.path.display()), err.error)
        })?;
        // The new contents are in place; a failed directory sync is not a failed save.
        if let Err(e) = rotate_fs::sync_dir(dir) {
            tracing::warn!(dir = %dir.display(), error = %e, "directory sync failed");
        }
        tracing::debug!(path = %self.path.display(), "saved credential file");
        Ok(())
    }

    /// Persist a rotated credential, keeping its preamble.
    pub fn resave(&self, credential: &Credential, secret: &str) -> Result<()> {
        self.save(&credential.preamble, secret)
    }

    /// Create a new credential file. Refuses to overwrite unless `force`.
    pub fn init(&self, preamble: &[String], secret: &str, force: bool) -> Result<()> {
        if self.path.exists() && !force {
            return Err(RotateError::Configuration(format!(
                "{} already exists (use --force to overwrite)",
                self.path.display()
            )));
        }
        if secret.trim().is_empty() {
            return Err(RotateError::Configuration("secret is empty".into()));
        }
        if let Some(bad) = preamble.iter().find(|l| !l.starts_with('#')) {
            return Err(RotateError::Configuration(format!(
                "comment line must start with '#': {}",
                bad
            )));
        }
        self.save(preamble, secret.trim())
    }
}

fn render(preamble: &[String], secret: &str) -> String {
    let mut out = String::new();
    for line in preamble {
        out.push_str(line);
        out.push('\n');
    }
    out.push_str(secret);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn store_with(dir: &TempDir, content: &str) -> CredentialStore {
        let path = dir.path().join("password.txt");
        fs::write(&path, content).unwrap();
        CredentialStore::new(path)
    }

    #[test]
    fn test_load_comment_then_secret() {
        let dir = TempDir::new().unwrap();
        let store = store_with(&dir, "#note\nold123\n");
        let cred = store.load().unwrap();
        assert_eq!(cred.preamble, vec!["#note".to_string()]);
        assert_eq!(cred.secret().unwrap(), "old123");
    }

    #[test]
    fn test_save_exact_layout() {
        let dir = TempDir::new().unwrap();
        let store = store_with(&dir, "#note\nold123\n");
        let cred = store.load().unwrap();
        store.resave(&cred, "newabc1").unwrap();
        assert_eq!(fs::read_to_string(store.path()).unwrap(), "#note\nnewabc1");
    }

    #[test]
    fn test_save_leaves_only_the_store_in_dir() {
        let dir = TempDir::new().unwrap();
        let store = store_with(&dir, "old123\n");
        store.save(&[], "newabc1").unwrap();
        let names: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(names, vec![std::ffi::OsString::from("password.txt")]);
        assert_eq!(fs::read_to_string(store.path()).unwrap(), "newabc1");
    }

    #[test]
    fn test_round_trip_is_byte_identical() {
        let dir = TempDir::new().unwrap();
        let content = "# first\n#second  \n#\nsecret9";
        let store = store_with(&dir, content);
        let cred = store.load().unwrap();
        store.resave(&cred, cred.secret().unwrap()).unwrap();
        assert_eq!(fs::read_to_string(store.path()).unwrap(), content);
    }

    #[test]
    fn test_lines_after_secret_are_dropped() {
        let dir = TempDir::new().unwrap();
        let store = store_with(&dir, "#a\npw1\n#trailing\nmore\n");
        let cred = store.load().unwrap();
        assert_eq!(cred.preamble, vec!["#a".to_string()]);
        store.resave(&cred, "pw2").unwrap();
        assert_eq!(fs::read_to_string(store.path()).unwrap(), "#a\npw2");
    }

    #[test]
    fn test_secret_is_trimmed() {
        let dir = TempDir::new().unwrap();
        let store = store_with(&dir, "  spaced1 \t\n");
        assert_eq!(store.load().unwrap().secret().unwrap(), "spaced1");
    }

    #[test]
    fn test_crlf_file_loads() {
        let dir = TempDir::new().unwrap();
        let store = store_with(&dir, "#dos\r\npw7\r\n");
        let cred = store.load().unwrap();
        assert_eq!(cred.preamble, vec!["#dos".to_string()]);
        assert_eq!(cred.secret().unwrap(), "pw7");
    }

    #[test]
    fn test_comments_only_has_no_secret() {
        let dir = TempDir::new().unwrap();
        let store = store_with(&dir, "#one\n#two\n");
        let cred = store.load().unwrap();
        assert!(cred.secret.is_none());
        assert!(matches!(cred.secret(), Err(RotateError::MissingSecret(_))));
    }

    #[test]
    fn test_blank_line_is_empty_secret_not_missing() {
        let dir = TempDir::new().unwrap();
        let store = store_with(&dir, "#c\n\nlater\n");
        let cred = store.load().unwrap();
        assert_eq!(cred.secret().unwrap(), "");
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let dir = TempDir::new().unwrap();
        let store = CredentialStore::new(dir.path().join("nope.txt"));
        assert!(matches!(store.load(), Err(RotateError::Io { .. })));
    }

    #[test]
    fn test_save_into_missing_dir_fails() {
        let dir = TempDir::new().unwrap();
        let store = CredentialStore::new(dir.path().join("missing-dir").join("password.txt"));
        assert!(store.save(&[], "pw").is_err());
        assert!(!store.path().exists());
    }

    #[cfg(unix)]
    #[test]
    fn test_save_sets_owner_only_mode() {
        let dir = TempDir::new().unwrap();
        let store = store_with(&dir, "pw1");
        store.save(&[], "pw2").unwrap();
        let mode = fs::metadata(store.path()).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode, 0o600);
    }

    #[test]
    fn test_init_refuses_overwrite() {
        let dir = TempDir::new().unwrap();
        let store = store_with(&dir, "pw1");
        let err = store.init(&[], "pw2", false).unwrap_err();
        assert!(matches!(err, RotateError::Configuration(_)));
        store.init(&["# rotated".into()], "pw2", true).unwrap();
        assert_eq!(fs::read_to_string(store.path()).unwrap(), "# rotated\npw2");
    }

    #[test]
    fn test_fixture_preamble_preserved() {
        let fixture = Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/password.txt");
        let dir = TempDir::new().unwrap();
        let store = store_with(&dir, &fs::read_to_string(fixture).unwrap());
        let cred = store.load().unwrap();
        assert_eq!(cred.preamble.len(), 3);
        assert_eq!(cred.secret().unwrap(), "old123x");
        store.resave(&cred, "new456y").unwrap();
        let saved = fs::read_to_string(store.path()).unwrap();
        assert!(saved.starts_with("# Password for the catalog FTP account.\n"));
        assert!(saved.ends_with("#\nnew456y"));
        assert!(!saved.contains("anything below"));
    }

    #[test]
    fn test_init_rejects_uncommented_preamble() {
        let dir = TempDir::new().unwrap();
        let store = CredentialStore::new(dir.path().join("password.txt"));
        assert!(store.init(&["note".into()], "pw", false).is_err());
    }
}
