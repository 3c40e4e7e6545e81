//! Read-only diagnostics for config, credential file, and connectivity.

use crate::cli::CliContext;
use crate::constants;
use crate::core::config;
use crate::core::credstore::CredentialStore;
use crate::core::lock::RotationLock;
use crate::core::session::{self, ProtocolClient};
use crate::util::fs as rotate_fs;
use anyhow::{bail, Result};
use clap::Args;

#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Skip resolving the remote host
    #[arg(long)]
    pub offline: bool,
}

pub fn run(ctx: &CliContext, args: CheckArgs) -> Result<()> {
    let paths = &ctx.paths;
    let cfg = &ctx.config;
    let mut ok = 0u32;
    let mut warn = 0u32;
    let mut fail = 0u32;

    println!("Check: {}", paths);

    // Config file
    if let Some(w) = &ctx.config_load_warning {
        println!("  [FAIL] {}", w);
        fail += 1;
    } else if paths.config.is_file() {
        println!("  [PASS] config loaded: {}", paths.config.display());
        ok += 1;
    } else {
        println!("  [INFO] no config at {} (using defaults and flags)", paths.config.display());
    }

    match config::validate(cfg) {
        Ok(()) => {
            println!("  [PASS] configuration valid");
            ok += 1;
        }
        Err(e) => {
            println!("  [FAIL] {}", e);
            fail += 1;
        }
    }

    // Credential file
    let store = CredentialStore::new(&paths.store);
    match store.load() {
        Ok(cred) => {
            println!(
                "  [PASS] credential file readable: {} ({} comment lines)",
                paths.store.display(),
                cred.preamble.len()
            );
            ok += 1;
            match cred.secret() {
                Ok(secret) => {
                    let user = cfg.account.user.as_deref().unwrap_or("user");
                    match session::validate_fields(user, secret, secret) {
                        Ok(()) => {
                            println!("  [PASS] password line present");
                            ok += 1;
                        }
                        Err(e) => {
                            println!("  [FAIL] password line unusable: {}", e);
                            fail += 1;
                        }
                    }
                }
                Err(e) => {
                    println!("  [FAIL] {}", e);
                    fail += 1;
                }
            }
        }
        Err(e) => {
            println!("  [FAIL] {}", e);
            fail += 1;
        }
    }

    if let Some(mode) = rotate_fs::mode(&paths.store) {
        if mode == constants::STORE_FILE_MODE {
            println!("  [PASS] credential file mode ok: {:04o}", mode);
            ok += 1;
        } else {
            println!(
                "  [WARN] credential file mode: {:04o} (expected {:04o})",
                mode,
                constants::STORE_FILE_MODE
            );
            warn += 1;
        }
    }

    // Another rotation in progress?
    match RotationLock::is_held(&paths.lock) {
        Ok(false) => {
            println!("  [PASS] no rotation in progress");
            ok += 1;
        }
        Ok(true) => {
            println!("  [WARN] rotation lock held: {}", paths.lock.display());
            warn += 1;
        }
        Err(e) => {
            println!("  [WARN] cannot check lock: {}", e);
            warn += 1;
        }
    }

    if !args.offline {
        match (config::account(cfg), config::session_options(cfg)) {
            (Ok(account), Ok(options)) => {
                let client = ProtocolClient::new(account.clone(), options);
                match client.resolve() {
                    Ok(addrs) => {
                        println!("  [PASS] {} resolves ({} address(es))", account.host, addrs.len());
                        ok += 1;
                    }
                    Err(e) => {
                        println!("  [FAIL] {}", e);
                        fail += 1;
                    }
                }
            }
            _ => println!("  [INFO] host resolution skipped (account incomplete)"),
        }
    }

    println!();
    println!("Check summary: {} pass, {} warn, {} fail", ok, warn, fail);
    if fail > 0 {
        bail!("{} check(s) failed", fail);
    }
    Ok(())
}
