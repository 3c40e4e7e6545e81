//! Data structures shared by the core and the CLI.

pub mod account;
pub mod config;
pub mod credential;
