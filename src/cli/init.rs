use crate::cli::CliContext;
use crate::core::credstore::CredentialStore;
use anyhow::{bail, Context, Result};
use clap::Args;
use dialoguer::Password;
use std::io::Read;
use zeroize::Zeroizing;

#[derive(Args, Debug)]
pub struct InitArgs {
    /// Read the current password from stdin instead of prompting
    #[arg(long)]
    pub from_stdin: bool,

    /// Comment line to place above the password (repeatable)
    #[arg(long, value_name = "TEXT")]
    pub comment: Vec<String>,

    /// Overwrite an existing credential file
    #[arg(long)]
    pub force: bool,
}

pub fn run(ctx: &CliContext, args: InitArgs) -> Result<()> {
    if ctx.non_interactive && !args.from_stdin {
        bail!("--non-interactive requires --from-stdin for init");
    }
    let secret = read_secret(args.from_stdin)?;
    let preamble = comment_lines(&args.comment);

    let store = CredentialStore::new(&ctx.paths.store);
    store.init(&preamble, &secret, args.force)?;
    println!("Wrote {}", store.path().display());
    Ok(())
}

fn read_secret(from_stdin: bool) -> Result<Zeroizing<String>> {
    if from_stdin {
        let mut buf = Zeroizing::new(String::new());
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("read password from stdin")?;
        let first = buf.lines().next().unwrap_or("").trim().to_string();
        return Ok(Zeroizing::new(first));
    }
    Ok(Zeroizing::new(
        Password::new()
            .with_prompt("Current password")
            .with_confirmation("Repeat password", "Passwords do not match")
            .allow_empty_password(false)
            .interact()
            .context("read password from prompt")?,
    ))
}

fn comment_lines(comments: &[String]) -> Vec<String> {
    comments
        .iter()
        .flat_map(|c| c.lines())
        .map(|line| {
            if line.starts_with('#') {
                line.to_string()
            } else {
                format!("# {}", line)
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_comment_lines_prefixed() {
        let lines = comment_lines(&["rotated by cron".into(), "#kept".into()]);
        assert_eq!(lines, vec!["# rotated by cron", "#kept"]);
    }

    #[test]
    fn test_multiline_comment_split() {
        let lines = comment_lines(&["a\nb".into()]);
        assert_eq!(lines, vec!["# a", "# b"]);
    }
}
