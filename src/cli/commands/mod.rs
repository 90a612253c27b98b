//! CLI command implementations

pub mod cache;
pub mod compile;
pub mod config;
pub mod install;
pub mod path;
pub mod status;

pub use cache::execute as cache;
pub use compile::execute as compile;
pub use config::execute as config;
pub use install::execute as install;
pub use path::execute as path;
pub use status::execute as status;

use crate::error::{CorekitError, CorekitResult};
use crate::provision::{PackageSpec, Provisioner};
use crate::ui::{self, DownloadBar, UiContext};
use std::path::PathBuf;

/// Ensure one package is installed, rendering download progress.
///
/// The provisioner blocks by contract, so it runs on the blocking pool.
pub(crate) async fn ensure_package(
    ctx: &UiContext,
    provisioner: &Provisioner,
    spec: PackageSpec,
) -> CorekitResult<PathBuf> {
    if provisioner.is_installed(&spec) {
        return provisioner.installed_path(&spec);
    }

    ui::step_info(ctx, &format!("Provisioning {spec}"));
    let bar = DownloadBar::new(ctx, &spec.name);

    let worker = provisioner.clone();
    let progress = bar.clone();
    let result = tokio::task::spawn_blocking(move || {
        worker.ensure_available(&spec, move |downloaded, total| progress.update(downloaded, total))
    })
    .await
    .map_err(|e| CorekitError::Internal(format!("provisioning task failed: {e}")))?;

    bar.finish();
    result
}
