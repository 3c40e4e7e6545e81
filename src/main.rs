use clap::Parser;
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = passrotate::cli::Cli::parse();
    match cli.run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            passrotate::cli::report(&err);
            ExitCode::from(passrotate::cli::exit_code(&err))
        }
    }
}
