//! Rotation lock: one rotation per credential file at a time (flock(2)).

use crate::constants;
use crate::error::{Result, RotateError};
use fs2::FileExt;
use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};

/// Held for the whole load → rotate → save sequence. Released on drop.
#[derive(Debug)]
pub struct RotationLock {
    _file: File,
    path: PathBuf,
}

impl RotationLock {
    /// Lock file path for a credential store.
    pub fn path_for(store: &Path) -> PathBuf {
        let mut name = store.as_os_str().to_owned();
        name.push(constants::LOCK_SUFFIX);
        PathBuf::from(name)
    }

    /// Take the lock without blocking. A held lock is `RotateError::Locked`.
    pub fn acquire(store: &Path) -> Result<Self> {
        let path = Self::path_for(store);
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(&path)
            .map_err(|e| RotateError::io(format!("open lock file {}", path.display()), e))?;
        match file.try_lock_exclusive() {
            Ok(()) => Ok(Self { _file: file, path }),
            Err(ref e) if e.kind() == std::io::ErrorKind::WouldBlock => {
                Err(RotateError::Locked(path))
            }
            // fs2 on Linux may return Other instead of WouldBlock
            Err(ref e) if e.raw_os_error() == Some(11) => Err(RotateError::Locked(path)),
            Err(e) => Err(RotateError::io(format!("lock {}", path.display()), e)),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether another process holds the lock at `lock_path`.
    ///
    /// Never creates the lock file. A missing file means nobody holds it.
    pub fn is_held(lock_path: &Path) -> Result<bool> {
        let file = match OpenOptions::new().write(true).open(lock_path) {
            Ok(file) => file,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(false),
            Err(e) => {
                return Err(RotateError::io(
                    format!("open lock file {}", lock_path.display()),
                    e,
                ))
            }
        };
        match file.try_lock_exclusive() {
            Ok(()) => Ok(false),
            Err(ref e) if e.kind() == std::io::ErrorKind::WouldBlock => Ok(true),
            Err(ref e) if e.raw_os_error() == Some(11) => Ok(true),
            Err(e) => Err(RotateError::io(format!("lock {}", lock_path.display()), e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_lock_path_appends_suffix() {
        assert_eq!(
            RotationLock::path_for(Path::new("/srv/password.txt")),
            PathBuf::from("/srv/password.txt.lock")
        );
    }

    #[test]
    fn test_second_acquire_is_locked() {
        let dir = TempDir::new().unwrap();
        let store = dir.path().join("password.txt");
        let lock = RotationLock::acquire(&store).unwrap();
        assert!(lock.path().exists());
        let err = RotationLock::acquire(&store).unwrap_err();
        assert!(matches!(err, RotateError::Locked(_)));
    }

    #[test]
    fn test_lock_released_on_drop() {
        let dir = TempDir::new().unwrap();
        let store = dir.path().join("password.txt");
        {
            let _lock = RotationLock::acquire(&store).unwrap();
        }
        assert!(RotationLock::acquire(&store).is_ok());
    }

    #[test]
    fn test_is_held_does_not_create_lock_file() {
        let dir = TempDir::new().unwrap();
        let lock_path = RotationLock::path_for(&dir.path().join("password.txt"));
        assert!(!RotationLock::is_held(&lock_path).unwrap());
        assert!(!lock_path.exists());
    }

    #[test]
    fn test_is_held_sees_active_lock() {
        let dir = TempDir::new().unwrap();
        let store = dir.path().join("password.txt");
        let lock = RotationLock::acquire(&store).unwrap();
        assert!(RotationLock::is_held(lock.path()).unwrap());
        drop(lock);
        assert!(!RotationLock::is_held(&RotationLock::path_for(&store)).unwrap());
    }
}
