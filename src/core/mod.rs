//! Core rotation logic (store, generator, session, orchestration).

pub mod config;
pub mod credstore;
pub mod history;
pub mod lock;
pub mod paths;
pub mod rotator;
pub mod secret;
pub mod session;

#[cfg(test)]
pub(crate) mod fake_server;
