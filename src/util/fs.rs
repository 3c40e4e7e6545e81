use std::fs;
use std::io;
use std::path::Path;

#[cfg(unix)]
use std::os::unix::fs::PermissionsExt;

pub fn set_mode(path: &Path, mode: u32) -> io::Result<()> {
    #[cfg(unix)]
    {
        fs::set_permissions(path, fs::Permissions::from_mode(mode))?;
    }
    #[cfg(not(unix))]
    {
        let _ = (path, mode);
    }
    Ok(())
}

/// Flush directory entries of `dir`, making a rename inside it durable.
pub fn sync_dir(dir: &Path) -> io::Result<()> {
    #[cfg(unix)]
    {
        fs::File::open(dir)?.sync_all()?;
    }
    #[cfg(not(unix))]
    {
        let _ = dir;
    }
    Ok(())
}

/// Permission bits of `path`, or `None` off unix or when it cannot be read.
pub fn mode(path: &Path) -> Option<u32> {
    #[cfg(unix)]
    {
        fs::metadata(path)
            .ok()
            .map(|m| m.permissions().mode() & 0o777)
    }
    #[cfg(not(unix))]
    {
        let _ = path;
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[cfg(unix)]
    #[test]
    fn test_set_and_read_mode() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("f");
        fs::write(&path, "x").unwrap();
        set_mode(&path, 0o640).unwrap();
        assert_eq!(mode(&path), Some(0o640));
    }

    #[test]
    fn test_sync_dir() {
        let dir = TempDir::new().unwrap();
        assert!(sync_dir(dir.path()).is_ok());
    }

    #[cfg(unix)]
    #[test]
    fn test_sync_dir_missing() {
        let dir = TempDir::new().unwrap();
        assert!(sync_dir(&dir.path().join("missing")).is_err());
    }

    #[test]
    fn test_mode_missing_file() {
        let dir = TempDir::new().unwrap();
        assert_eq!(mode(&dir.path().join("missing")), None);
    }
}
