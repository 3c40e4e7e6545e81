//! Scheduled password rotation for an FTP control-channel account.
//!
//! Reads the current password from a commented text file, changes it on the
//! server with the `PASS old/new/new` idiom, and writes the new password back
//! only after the server confirmed it.
//!
//! ## Modules
//! - `cli`: Command-line handlers
//! - `core`: Credential store, generator, session client, rotator
//! - `models`: Data structures
//! - `util`: Filesystem and logging helpers

pub mod cli;
pub mod constants;
pub mod core;
pub mod error;
pub mod models;
pub mod util;

pub use error::{FailureKind, RotateError};
