//! Progress indicators with CI fallback

use super::context::UiContext;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// A task spinner with CI fallback
pub struct TaskSpinner {
    spinner: Option<cliclack::ProgressBar>,
    interactive: bool,
}

impl TaskSpinner {
    /// Create a new spinner (shows immediately in interactive mode)
    pub fn new(ctx: &UiContext) -> Self {
        Self {
            spinner: None,
            interactive: ctx.use_fancy_output(),
        }
    }

    /// Start the spinner with a message
    pub fn start(&mut self, message: &str) {
        if self.interactive {
            let spinner = cliclack::spinner();
            spinner.start(message);
            self.spinner = Some(spinner);
        } else {
            println!("{} {}", style("...").dim(), message);
        }
    }

    /// Stop with success message
    pub fn stop(&mut self, message: &str) {
        if let Some(spinner) = self.spinner.take() {
            spinner.stop(message);
        } else if self.interactive {
            println!("{} {}", style("✓").green(), message);
        } else {
            println!("{} {}", style("[OK]").green(), message);
        }
    }

    /// Stop with error message
    pub fn stop_error(&mut self, message: &str) {
        if let Some(spinner) = self.spinner.take() {
            spinner.error(message);
        } else if self.interactive {
            println!("{} {}", style("✗").red(), message);
        } else {
            println!("{} {}", style("[FAIL]").red(), message);
        }
    }
}

/// Byte-progress bar for package downloads.
///
/// Interactive mode renders an indicatif bar; plain mode prints a line
/// every 10% so redirected output is not flooded. Handles are cheap to
/// clone and safe to update from a blocking worker thread.
#[derive(Clone)]
pub struct DownloadBar {
    bar: Option<ProgressBar>,
    label: String,
    last_decile: Arc<AtomicU64>,
}

impl DownloadBar {
    /// Create a progress bar for downloading `label`
    pub fn new(ctx: &UiContext, label: &str) -> Self {
        let bar = if ctx.use_fancy_output() {
            let bar = ProgressBar::new(0);
            bar.set_style(
                ProgressStyle::default_bar()
                    .template(
                        "  {spinner:.cyan} Downloading {prefix}  {bar:20.cyan/dim} {bytes}/{total_bytes}  {elapsed:.dim}",
                    )
                    .unwrap()
                    .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏ ")
                    .progress_chars("━╸─"),
            );
            bar.set_prefix(label.to_string());
            bar.enable_steady_tick(std::time::Duration::from_millis(120));
            Some(bar)
        } else {
            println!("Downloading {}...", label);
            None
        };
        Self {
            bar,
            label: label.to_string(),
            last_decile: Arc::new(AtomicU64::new(u64::MAX)),
        }
    }

    /// Report download progress in bytes
    pub fn update(&self, downloaded: u64, total: Option<u64>) {
        if let Some(ref bar) = self.bar {
            if let Some(total) = total {
                bar.set_length(total);
            }
            bar.set_position(downloaded);
        } else if let Some(total) = total.filter(|t| *t > 0) {
            let decile = downloaded * 10 / total;
            if self.last_decile.swap(decile, Ordering::Relaxed) != decile {
                println!(
                    "Downloading {}: {:.1}/{:.1} MB ({}%)",
                    self.label,
                    downloaded as f64 / 1_048_576.0,
                    total as f64 / 1_048_576.0,
                    decile * 10
                );
            }
        }
    }

    /// Finish and clear the progress bar
    pub fn finish(&self) {
        if let Some(ref bar) = self.bar {
            bar.disable_steady_tick();
            bar.finish_and_clear();
        }
    }
}
