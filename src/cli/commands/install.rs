//! Install command - provision packages into the cache

use crate::cli::args::{InstallArgs, PackageTarget};
use crate::cli::commands::ensure_package;
use crate::config::Config;
use crate::error::{CorekitError, CorekitResult};
use crate::provision::{HostPlatform, PackageSpec, Provisioner};
use crate::ui::{self, UiContext};
use std::path::PathBuf;
use std::time::Duration;

/// Execute the install command
pub async fn execute(args: InstallArgs, config: &Config, cache_root: PathBuf) -> CorekitResult<()> {
    let ctx = UiContext::detect();
    ui::intro(&ctx, "corekit install");

    let provisioner = Provisioner::new(cache_root)
        .with_lock_timeout(Duration::from_secs(config.cache.lock_timeout_secs));

    for spec in selected_specs(args.target, config)? {
        if args.force {
            let worker = provisioner.clone();
            let target = spec.clone();
            tokio::task::spawn_blocking(move || worker.remove(&target))
                .await
                .map_err(|e| CorekitError::Internal(format!("remove task failed: {e}")))??;
        } else if provisioner.is_installed(&spec) {
            ui::step_ok_detail(
                &ctx,
                &format!("{spec} already installed"),
                &provisioner.install_dir(&spec).display().to_string(),
            );
            continue;
        }

        let path = ensure_package(&ctx, &provisioner, spec.clone()).await?;
        ui::step_ok_detail(&ctx, &format!("{spec} installed"), &path.display().to_string());
    }

    ui::outro_success(&ctx, "All requested packages are ready");
    Ok(())
}

/// Resolve which package specs the target selects
fn selected_specs(target: PackageTarget, config: &Config) -> CorekitResult<Vec<PackageSpec>> {
    let mut specs = Vec::new();
    if matches!(target, PackageTarget::Core | PackageTarget::All) {
        specs.push(config.core_spec()?);
    }
    if matches!(target, PackageTarget::Toolchain | PackageTarget::All) {
        specs.push(config.toolchain_spec(HostPlatform::detect()?)?);
    }
    Ok(specs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provision::{CORE_PACKAGE, TOOLCHAIN_PACKAGE};

    #[test]
    fn all_selects_both_packages() {
        let config = Config::default();
        let specs = selected_specs(PackageTarget::All, &config).unwrap();
        let names: Vec<_> = specs.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec![CORE_PACKAGE, TOOLCHAIN_PACKAGE]);
    }

    #[test]
    fn core_selects_only_core() {
        let config = Config::default();
        let specs = selected_specs(PackageTarget::Core, &config).unwrap();
        assert_eq!(specs.len(), 1);
        assert_eq!(specs[0].name, CORE_PACKAGE);
        assert_eq!(specs[0].version, config.core.version);
    }
}
