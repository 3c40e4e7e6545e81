//! CLI routing and command dispatch.

use crate::core::config::{self, Overrides};
use crate::core::paths::RotatePaths;
use crate::error::RotateError;
use crate::models::config::RotateConfig;
use crate::util::logging;
use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

pub mod check;
pub mod history;
pub mod init;
pub mod rotate;

/// Exit code when the remote password changed but the file was not updated.
pub const EXIT_UNSAVED: u8 = 3;

/// Shared context passed to all command handlers.
pub struct CliContext {
    pub paths: RotatePaths,
    pub config: RotateConfig,
    pub non_interactive: bool,
    pub config_load_warning: Option<String>,
}

#[derive(Parser, Debug)]
#[command(name = "passrotate", version, about = "Rotate an FTP account password and keep the local copy in sync")]
pub struct Cli {
    /// Config file (default: passrotate.toml)
    #[arg(long, global = true, value_name = "PATH", env = "PASSROTATE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Credential file (overrides [store] path)
    #[arg(long, global = true, value_name = "PATH", env = "PASSROTATE_FILE")]
    pub file: Option<PathBuf>,

    /// Remote host (overrides [account] host)
    #[arg(long, global = true, env = "PASSROTATE_HOST")]
    pub host: Option<String>,

    /// Remote control port (overrides [account] port)
    #[arg(long, global = true, env = "PASSROTATE_PORT")]
    pub port: Option<u16>,

    /// Account name (overrides [account] user)
    #[arg(long, global = true, env = "PASSROTATE_USER")]
    pub user: Option<String>,

    /// Run in non-interactive mode (no prompts, suitable for automation)
    #[arg(long, global = true, env = "PASSROTATE_NON_INTERACTIVE")]
    pub non_interactive: bool,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    pub fn run(self) -> Result<()> {
        logging::init(self.verbose);

        let config_path = RotatePaths::config_path(self.config);
        let mut config_load_warning = None;
        let mut config = match config::load(&config_path) {
            Ok(config) => config,
            // `check` reports a broken config instead of refusing to run.
            Err(e) if matches!(self.command, Commands::Check(_)) => {
                config_load_warning = Some(e.to_string());
                RotateConfig::default()
            }
            Err(e) => return Err(e.into()),
        };

        let (length, timeout_secs, strict_replies) = match &self.command {
            Commands::Rotate(args) => (args.length, args.timeout, args.strict),
            _ => (None, None, false),
        };
        config::apply(
            &mut config,
            Overrides {
                host: self.host,
                port: self.port,
                user: self.user,
                length,
                timeout_secs,
                strict_replies,
            },
        );

        let paths = RotatePaths::resolve(config_path, self.file, &config);
        tracing::debug!(%paths, config = %paths.config.display(), "resolved paths");

        let ctx = CliContext {
            paths,
            config,
            non_interactive: self.non_interactive,
            config_load_warning,
        };

        match self.command {
            Commands::Rotate(args) => rotate::run(&ctx, args),
            Commands::Init(args) => init::run(&ctx, args),
            Commands::Check(args) => check::run(&ctx, args),
            Commands::History(args) => history::run(&ctx, args),
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Change the remote password and update the credential file
    Rotate(rotate::RotateArgs),
    /// Create the credential file with the current password
    Init(init::InitArgs),
    /// Diagnose config, credential file, and connectivity (read-only)
    Check(check::CheckArgs),
    /// Show past rotation attempts
    History(history::HistoryArgs),
}

/// Process exit code for a failed run.
pub fn exit_code(err: &anyhow::Error) -> u8 {
    if unsaved(err).is_some() {
        EXIT_UNSAVED
    } else {
        1
    }
}

/// Print a failure. An unsaved rotation also prints the new password, which
/// exists nowhere else.
pub fn report(err: &anyhow::Error) {
    eprintln!("error: {:#}", err);
    if let Some(RotateError::Unsaved {
        path, new_secret, ..
    }) = unsaved(err)
    {
        eprintln!(
            "the server now expects this password; store it in {} by hand:",
            path.display()
        );
        eprintln!("{}", new_secret.expose());
    }
}

fn unsaved(err: &anyhow::Error) -> Option<&RotateError> {
    err.chain()
        .filter_map(|e| e.downcast_ref::<RotateError>())
        .find(|e| matches!(e, RotateError::Unsaved { .. }))
}
