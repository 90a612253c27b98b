//! Cache command - inspect and clear the package cache

use crate::cli::args::{CacheAction, CacheArgs, OutputFormat};
use crate::error::CorekitResult;
use crate::provision::{CacheEntry, Provisioner};
use crate::ui::{self, UiContext};
use console::style;
use std::path::PathBuf;

/// Execute the cache command
pub async fn execute(args: CacheArgs, cache_root: PathBuf) -> CorekitResult<()> {
    let provisioner = Provisioner::new(cache_root);

    match args.action {
        CacheAction::Info { format } => info(&provisioner, format),
        CacheAction::Clear { package, yes } => clear(&provisioner, package, yes).await,
    }
}

fn info(provisioner: &Provisioner, format: OutputFormat) -> CorekitResult<()> {
    let entries = provisioner.entries()?;

    if entries.is_empty() {
        println!("No packages installed.");
        println!("Cache root: {}", provisioner.cache_root().display());
        return Ok(());
    }

    match format {
        OutputFormat::Table => print_table(&entries),
        OutputFormat::Json => print_json(&entries)?,
        OutputFormat::Plain => print_plain(&entries),
    }

    Ok(())
}

fn print_table(entries: &[CacheEntry]) {
    println!(
        "{:<20} {:<28} {:>10}  {:<17} PATH",
        "PACKAGE", "VERSION", "SIZE", "INSTALLED"
    );
    println!("{}", "-".repeat(100));

    for entry in entries {
        println!(
            "{:<20} {:<28} {:>10}  {:<17} {}",
            entry.name,
            entry.version,
            format_bytes(entry.size_bytes),
            entry.installed_at.format("%Y-%m-%d %H:%M"),
            entry.path.display()
        );
    }

    println!();
    println!("Total: {} package(s)", entries.len());
}

fn print_json(entries: &[CacheEntry]) -> CorekitResult<()> {
    println!("{}", serde_json::to_string_pretty(entries)?);
    Ok(())
}

fn print_plain(entries: &[CacheEntry]) {
    for entry in entries {
        println!("{} {}", entry.name, entry.version);
    }
}

async fn clear(
    provisioner: &Provisioner,
    package: Option<String>,
    yes: bool,
) -> CorekitResult<()> {
    let ctx = UiContext::detect().with_auto_yes(yes);

    let prompt = match &package {
        Some(name) => format!("Remove all cached versions of '{name}'?"),
        None => format!(
            "Remove the entire cache at {}?",
            provisioner.cache_root().display()
        ),
    };

    if !ui::confirm(&ctx, &prompt, false).await? {
        println!("Aborted.");
        return Ok(());
    }

    match package {
        Some(name) => {
            if provisioner.clear_package(&name)? {
                ui::step_ok(&ctx, &format!("Removed cached package '{name}'"));
            } else {
                println!("{} nothing cached for '{}'", style("!").yellow(), name);
            }
        }
        None => {
            provisioner.clear_all()?;
            ui::step_ok(&ctx, "Cache cleared");
        }
    }

    Ok(())
}

/// Format bytes as human-readable size (e.g. "1.5 GB")
fn format_bytes(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.1} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}
