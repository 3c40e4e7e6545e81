use crate::cli::CliContext;
use crate::core::history::{History, Outcome};
use anyhow::{bail, Context, Result};
use chrono::{DateTime, Local};
use clap::Args;
use comfy_table::{presets::UTF8_FULL, Attribute, Cell, Color, Table};

#[derive(Args, Debug)]
pub struct HistoryArgs {
    /// Maximum number of entries to display
    #[arg(long, default_value_t = 20)]
    pub limit: usize,

    /// Output format: table|json
    #[arg(long, default_value = "table")]
    pub format: String,
}

pub fn run(ctx: &CliContext, args: HistoryArgs) -> Result<()> {
    if args.format != "table" && args.format != "json" {
        bail!("invalid format: {} (use table|json)", args.format);
    }
    let entries = History::new(&ctx.paths.history).read(Some(args.limit))?;

    if args.format == "json" {
        let json = serde_json::to_string_pretty(&entries).context("serialize history")?;
        println!("{}", json);
        return Ok(());
    }

    if entries.is_empty() {
        println!("No rotations recorded in {}", ctx.paths.history.display());
        return Ok(());
    }

    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(vec![
        Cell::new("Timestamp").add_attribute(Attribute::Bold),
        Cell::new("Account").add_attribute(Attribute::Bold),
        Cell::new("Actor").add_attribute(Attribute::Bold),
        Cell::new("Outcome").add_attribute(Attribute::Bold),
        Cell::new("Detail").add_attribute(Attribute::Bold),
    ]);

    for entry in &entries {
        let local: DateTime<Local> = entry.timestamp.into();
        let color = match entry.outcome {
            Outcome::Rotated => Color::Green,
            Outcome::Failed => Color::Yellow,
            Outcome::Unsaved => Color::Red,
        };
        let detail = entry
            .error
            .as_deref()
            .or(entry.warning.as_deref())
            .unwrap_or("-");
        table.add_row(vec![
            Cell::new(local.format("%Y-%m-%d %H:%M:%S")),
            Cell::new(format!("{}@{}", entry.user, entry.host)),
            Cell::new(&entry.actor),
            Cell::new(entry.outcome).fg(color),
            Cell::new(detail),
        ]);
    }

    println!("{}", table);
    println!("\n{} entries shown.", entries.len());
    Ok(())
}
