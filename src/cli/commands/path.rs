//! Path command - print installed package paths for scripting
//!
//! External build tooling locates the provisioned compiler and core
//! through this command, so the output is the bare path and nothing else.

use crate::cli::args::{PathArgs, PathTarget};
use crate::config::Config;
use crate::error::CorekitResult;
use crate::provision::{HostPlatform, Provisioner};
use std::path::PathBuf;

/// Execute the path command
pub async fn execute(args: PathArgs, config: &Config, cache_root: PathBuf) -> CorekitResult<()> {
    let provisioner = Provisioner::new(cache_root);

    let spec = match args.target {
        PathTarget::Core => config.core_spec()?,
        PathTarget::Toolchain => config.toolchain_spec(HostPlatform::detect()?)?,
    };

    let path = provisioner.installed_path(&spec)?;
    println!("{}", path.display());
    Ok(())
}
