//! Centralized defaults for the account, store, and session.

/// Well-known FTP control port.
pub const DEFAULT_PORT: u16 = 21;

/// Default credential file, relative to the working directory.
pub const DEFAULT_STORE_PATH: &str = "password.txt";

/// Default configuration file, relative to the working directory.
pub const DEFAULT_CONFIG_PATH: &str = "passrotate.toml";

/// Suffix appended to the store path for the rotation lock file.
pub const LOCK_SUFFIX: &str = ".lock";

/// Suffix appended to the store path for the rotation history log.
pub const HISTORY_SUFFIX: &str = ".history";

/// Length of generated passwords. The remote system caps passwords at 8.
pub const DEFAULT_SECRET_LENGTH: usize = 8;

/// Characters generated passwords are drawn from. Must contain a digit.
pub const DEFAULT_ALPHABET: &str =
    "ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";

/// Per read/write timeout on the control connection, in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Longest reply line accepted from the server, in bytes.
pub const MAX_REPLY_LINE: u64 = 4096;

/// Permission mode for the credential file.
pub const STORE_FILE_MODE: u32 = 0o600;

/// Reply code the server greets with.
pub const CODE_READY: u16 = 220;

/// Reply code asking for a password after USER.
pub const CODE_NEED_PASSWORD: u16 = 331;

/// Reply code confirming login (and the password change).
pub const CODE_LOGGED_IN: u16 = 230;

/// Reply code acknowledging QUIT.
pub const CODE_CLOSING: u16 = 221;
