//! Compile command - build a sketch against the provisioned core
//!
//! Provisions the core and toolchain first, so a compile on a fresh
//! machine downloads everything it needs without a separate install step.

use crate::build::{BuildOptions, CoreLayout, SketchBuilder, Toolchain};
use crate::cli::args::CompileArgs;
use crate::cli::commands::ensure_package;
use crate::config::Config;
use crate::error::CorekitResult;
use crate::provision::{HostPlatform, Provisioner};
use crate::ui::{self, TaskSpinner, UiContext};
use std::path::PathBuf;
use std::time::Duration;

/// Execute the compile command
pub async fn execute(args: CompileArgs, config: &Config, cache_root: PathBuf) -> CorekitResult<()> {
    let ctx = UiContext::detect();
    ui::intro(&ctx, "corekit compile");

    let provisioner = Provisioner::new(cache_root)
        .with_lock_timeout(Duration::from_secs(config.cache.lock_timeout_secs));

    let platform = HostPlatform::detect()?;
    let core_root = ensure_package(&ctx, &provisioner, config.core_spec()?).await?;
    let toolchain_root =
        ensure_package(&ctx, &provisioner, config.toolchain_spec(platform)?).await?;

    let mut options = BuildOptions::from_config(&config.build);
    if let Some(variant) = args.variant {
        options.variant = variant;
    }
    if let Some(mcu) = args.mcu {
        options.mcu = mcu;
    }
    if let Some(f_cpu) = args.f_cpu {
        options.f_cpu = f_cpu;
    }

    let build_dir = args.output.unwrap_or_else(|| default_build_dir(&args.sketch));

    let builder = SketchBuilder::new(
        Toolchain::new(toolchain_root),
        CoreLayout::new(core_root),
        options,
        build_dir,
    );

    let mut spinner = TaskSpinner::new(&ctx);
    spinner.start(&format!("Compiling {}", args.sketch.display()));

    match builder.compile(&args.sketch).await {
        Ok(artifacts) => {
            spinner.stop("Build succeeded");
            ui::key_value(&ctx, "ELF", &artifacts.elf.display().to_string());
            ui::key_value(&ctx, "HEX", &artifacts.hex.display().to_string());
            println!();
            println!("{}", artifacts.size_report.trim_end());
            ui::outro_success(&ctx, "Sketch compiled");
            Ok(())
        }
        Err(e) => {
            spinner.stop_error("Build failed");
            Err(e)
        }
    }
}

fn default_build_dir(sketch: &PathBuf) -> PathBuf {
    sketch
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map(|p| p.join("build"))
        .unwrap_or_else(|| PathBuf::from("build"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_dir_next_to_sketch() {
        let dir = default_build_dir(&PathBuf::from("/projects/blink/blink.ino"));
        assert_eq!(dir, PathBuf::from("/projects/blink/build"));
    }

    #[test]
    fn build_dir_for_bare_file_name() {
        let dir = default_build_dir(&PathBuf::from("blink.ino"));
        assert_eq!(dir, PathBuf::from("build"));
    }
}
