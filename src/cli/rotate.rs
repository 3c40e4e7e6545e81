use crate::cli::CliContext;
use crate::core::config;
use crate::core::credstore::CredentialStore;
use crate::core::history::History;
use crate::core::rotator::Rotator;
use crate::core::session::ProtocolClient;
use anyhow::{Context, Result};
use clap::Args;

#[derive(Args, Debug)]
pub struct RotateArgs {
    /// Check config, file, and host resolution without contacting the server
    #[arg(long)]
    pub dry_run: bool,

    /// Fail on unexpected reply codes instead of logging a warning
    #[arg(long)]
    pub strict: bool,

    /// Length of the generated password (overrides [secret] length)
    #[arg(long)]
    pub length: Option<usize>,

    /// Per read/write timeout in seconds (overrides [session] timeout_secs)
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Do not append to the history log
    #[arg(long)]
    pub no_history: bool,
}

pub fn run(ctx: &CliContext, args: RotateArgs) -> Result<()> {
    let cfg = &ctx.config;
    config::validate(cfg).context("invalid configuration")?;
    let account = config::account(cfg)?;
    let client = ProtocolClient::new(account.clone(), config::session_options(cfg)?);
    let generator = config::generator(cfg)?;
    let store = CredentialStore::new(&ctx.paths.store);

    let mut rotator = Rotator::new(store, Box::new(generator), client);
    if cfg.history.enabled && !args.no_history && !args.dry_run {
        rotator = rotator.with_history(History::new(&ctx.paths.history));
    }

    if args.dry_run {
        let plan = rotator.dry_run().context("dry run")?;
        println!("Dry run for {}", account);
        println!("  credential file: {}", ctx.paths.store.display());
        println!("  comment lines:   {}", plan.comment_lines);
        println!("  current length:  {}", plan.secret_length);
        println!("  new length:      {}", plan.candidate_length);
        for addr in &plan.addrs {
            println!("  resolves to:     {}", addr);
        }
        println!("No connection made, nothing written.");
        return Ok(());
    }

    let report = rotator
        .rotate()
        .with_context(|| format!("rotate password for {}", account))?;
    if let Some(warning) = &report.quit_warning {
        eprintln!("warning: {}", warning);
    }
    println!("Rotated password for {}; updated {}", account, ctx.paths.store.display());
    Ok(())
}
