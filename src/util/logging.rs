//! tracing subscriber setup. Logs go to stderr; stdout is for command output.

use tracing_subscriber::EnvFilter;

/// `RUST_LOG` wins; otherwise `-v` raises our level from warn to info, debug, trace.
pub fn init(verbosity: u8) {
    let level = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("passrotate={level},warn")));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
