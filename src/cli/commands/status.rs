//! Status command - installed packages and compiler health

use crate::build::Toolchain;
use crate::config::Config;
use crate::error::CorekitResult;
use crate::provision::{HostPlatform, Provisioner, CORE_PACKAGE, TOOLCHAIN_PACKAGE};
use crate::ui::{self, UiContext};
use semver::Version;
use std::path::PathBuf;

/// Execute the status command
pub async fn execute(config: &Config, cache_root: PathBuf) -> CorekitResult<()> {
    let ctx = UiContext::detect();
    ui::intro(&ctx, "corekit status");

    ui::key_value(&ctx, "Cache root", &cache_root.display().to_string());
    let provisioner = Provisioner::new(cache_root);

    report_package(&ctx, &provisioner, CORE_PACKAGE, &config.core.version);
    report_package(&ctx, &provisioner, TOOLCHAIN_PACKAGE, &config.toolchain.version);

    probe_compiler(&ctx, &provisioner, config).await;

    Ok(())
}

fn report_package(ctx: &UiContext, provisioner: &Provisioner, name: &str, configured: &str) {
    let mut versions = provisioner.installed_versions(name);
    if versions.is_empty() {
        ui::step_warn_hint(ctx, &format!("{name} not installed"), "Run: corekit install");
        return;
    }

    sort_versions(&mut versions);
    ui::key_value(ctx, name, &versions.join(", "));

    if !versions.iter().any(|v| v == configured) {
        ui::step_warn_hint(
            ctx,
            &format!("{name}: configured version {configured} is not installed"),
            "Run: corekit install",
        );
    }
}

/// Probe the installed compiler so a broken toolchain surfaces here, not
/// on the first compile
async fn probe_compiler(ctx: &UiContext, provisioner: &Provisioner, config: &Config) {
    let Ok(platform) = HostPlatform::detect() else {
        return;
    };
    let Ok(spec) = config.toolchain_spec(platform) else {
        return;
    };
    let Ok(root) = provisioner.installed_path(&spec) else {
        return;
    };

    match Toolchain::new(root).version().await {
        Ok(version) => ui::key_value(ctx, "Compiler", &version),
        Err(_) => ui::step_warn_hint(
            ctx,
            "Compiler did not respond to --version",
            "Reinstall with: corekit install toolchain --force",
        ),
    }
}

/// Sort versions semver-aware, falling back to lexical order for
/// non-semver strings
fn sort_versions(versions: &mut [String]) {
    versions.sort_by(|a, b| match (Version::parse(a), Version::parse(b)) {
        (Ok(a), Ok(b)) => a.cmp(&b),
        _ => a.cmp(b),
    });
}
