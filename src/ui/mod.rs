//! UI module for consistent CLI output
//!
//! Uses `cliclack` steps and spinners with automatic fallback to plain
//! output in CI/non-interactive environments, plus an `indicatif` byte
//! progress bar for downloads.

mod context;
mod output;
mod progress;
mod prompts;

pub use context::UiContext;
pub use output::{
    intro, key_value, outro_success, step_info, step_ok, step_ok_detail, step_warn_hint,
};
pub use progress::{DownloadBar, TaskSpinner};
pub use prompts::confirm;
