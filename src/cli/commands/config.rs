//! Config command - show or edit configuration

use crate::cli::args::{ConfigAction, ConfigArgs};
use crate::config::{Config, ConfigManager};
use crate::error::{CorekitError, CorekitResult};
use crate::ui::{self, UiContext};
use std::path::PathBuf;

/// Execute the config command
pub async fn execute(args: ConfigArgs, config: &Config, manager: &ConfigManager) -> CorekitResult<()> {
    match args.action {
        None | Some(ConfigAction::Show) => show_config(config),
        Some(ConfigAction::Path) => show_path(manager),
        Some(ConfigAction::Init { force }) => init_config(manager, force).await?,
        Some(ConfigAction::Set { key, value }) => set_value(manager, config, &key, &value).await?,
    }

    Ok(())
}

fn show_config(config: &Config) {
    let toml =
        toml::to_string_pretty(config).unwrap_or_else(|_| "Error serializing config".to_string());
    println!("{}", toml);
}

fn show_path(manager: &ConfigManager) {
    println!("{}", manager.path().display());
}

async fn init_config(manager: &ConfigManager, force: bool) -> CorekitResult<()> {
    let ctx = UiContext::detect();
    let path = manager.path();

    if path.exists() && !force {
        ui::step_warn_hint(
            &ctx,
            &format!("Config already exists at {}", path.display()),
            "Use --force to overwrite",
        );
        return Ok(());
    }

    let config = Config::default();
    manager.save(&config).await?;

    ui::step_ok_detail(
        &ctx,
        "Configuration initialized",
        &path.display().to_string(),
    );

    Ok(())
}

async fn set_value(
    manager: &ConfigManager,
    config: &Config,
    key: &str,
    value: &str,
) -> CorekitResult<()> {
    let ctx = UiContext::detect();
    let mut config = config.clone();

    apply_key(&mut config, key, value)?;

    manager.save(&config).await?;
    ui::step_ok(&ctx, &format!("Set {} = {}", key, value));

    Ok(())
}

/// Apply a dot-separated key to the typed config
fn apply_key(config: &mut Config, key: &str, value: &str) -> CorekitResult<()> {
    let parts: Vec<&str> = key.split('.').collect();

    match parts.as_slice() {
        ["general", "log_format"] => config.general.log_format = value.to_string(),

        ["cache", "root"] => config.cache.root = Some(PathBuf::from(value)),
        ["cache", "lock_timeout_secs"] => config.cache.lock_timeout_secs = parse_u64(value)?,

        ["core", "version"] => config.core.version = value.to_string(),
        ["core", "url"] => config.core.url = Some(value.to_string()),
        ["core", "sha256"] => config.core.sha256 = Some(value.to_string()),

        ["toolchain", "version"] => config.toolchain.version = value.to_string(),
        ["toolchain", "url"] => config.toolchain.url = Some(value.to_string()),
        ["toolchain", "sha256"] => config.toolchain.sha256 = Some(value.to_string()),

        ["build", "variant"] => config.build.variant = value.to_string(),
        ["build", "mcu"] => config.build.mcu = value.to_string(),
        ["build", "f_cpu"] => config.build.f_cpu = parse_u32(value)?,

        _ => {
            return Err(CorekitError::User(format!(
                "Unknown config key: {key}. Valid keys:\n{}",
                valid_keys().join("\n")
            )))
        }
    }

    Ok(())
}

fn valid_keys() -> Vec<&'static str> {
    vec![
        "  general.log_format",
        "  cache.root",
        "  cache.lock_timeout_secs",
        "  core.version",
        "  core.url",
        "  core.sha256",
        "  toolchain.version",
        "  toolchain.url",
        "  toolchain.sha256",
        "  build.variant",
        "  build.mcu",
        "  build.f_cpu",
    ]
}

fn parse_u32(value: &str) -> CorekitResult<u32> {
    value
        .parse()
        .map_err(|_| CorekitError::User(format!("Invalid number: {}", value)))
}

fn parse_u64(value: &str) -> CorekitResult<u64> {
    value
        .parse()
        .map_err(|_| CorekitError::User(format!("Invalid number: {}", value)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn apply_known_keys() {
        let mut config = Config::default();
        apply_key(&mut config, "core.version", "1.8.3").unwrap();
        apply_key(&mut config, "build.f_cpu", "8000000").unwrap();
        apply_key(&mut config, "cache.root", "/opt/cache").unwrap();

        assert_eq!(config.core.version, "1.8.3");
        assert_eq!(config.build.f_cpu, 8_000_000);
        assert_eq!(config.cache.root, Some(PathBuf::from("/opt/cache")));
    }

    #[test]
    fn apply_unknown_key_errors() {
        let mut config = Config::default();
        let err = apply_key(&mut config, "core.checksum", "x").unwrap_err();
        assert!(err.to_string().contains("Unknown config key"));
        assert!(err.to_string().contains("core.sha256"));
    }

    #[test]
    fn apply_bad_number_errors() {
        let mut config = Config::default();
        assert!(apply_key(&mut config, "build.f_cpu", "sixteen").is_err());
    }
}
