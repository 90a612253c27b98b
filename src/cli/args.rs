//! CLI argument definitions using clap derive

use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// corekit - Arduino core and toolchain provisioner
///
/// Downloads and caches the Arduino AVR core and the AVR cross-toolchain,
/// and compiles sketches against them.
#[derive(Parser, Debug)]
#[command(name = "corekit")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Configuration file path
    #[arg(short, long, global = true, env = "COREKIT_CONFIG")]
    pub config: Option<PathBuf>,

    /// Package cache directory override
    #[arg(long, global = true, env = "COREKIT_CACHE_DIR")]
    pub cache_dir: Option<PathBuf>,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Download and install packages into the cache
    Install(InstallArgs),

    /// Show installed packages and configuration
    Status,

    /// Print the installed path of a package
    Path(PathArgs),

    /// Compile a sketch against the provisioned core
    Compile(CompileArgs),

    /// Inspect or clear the package cache
    Cache(CacheArgs),

    /// Show or edit configuration
    Config(ConfigArgs),
}

/// Packages that can be installed
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PackageTarget {
    /// Arduino AVR core sources
    Core,
    /// AVR cross-toolchain
    Toolchain,
    /// Both packages
    All,
}

/// Arguments for the install command
#[derive(Parser, Debug)]
pub struct InstallArgs {
    /// Which package(s) to install
    #[arg(value_enum, default_value = "all")]
    pub target: PackageTarget,

    /// Remove any existing entry first and re-download
    #[arg(short, long)]
    pub force: bool,
}

/// Arguments for the path command
#[derive(Parser, Debug)]
pub struct PathArgs {
    /// Which package's installed path to print
    #[arg(value_enum)]
    pub target: PathTarget,
}

/// Single-package selector for path lookups
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PathTarget {
    /// Arduino AVR core sources
    Core,
    /// AVR cross-toolchain
    Toolchain,
}

/// Arguments for the compile command
#[derive(Parser, Debug)]
pub struct CompileArgs {
    /// Sketch file to compile
    pub sketch: PathBuf,

    /// Board variant (defaults from config)
    #[arg(long)]
    pub variant: Option<String>,

    /// Target MCU (defaults from config)
    #[arg(long)]
    pub mcu: Option<String>,

    /// CPU frequency in Hz (defaults from config)
    #[arg(long)]
    pub f_cpu: Option<u32>,

    /// Build output directory (defaults to ./build next to the sketch)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Arguments for the cache command
#[derive(Parser, Debug)]
pub struct CacheArgs {
    /// Subcommand for cache
    #[command(subcommand)]
    pub action: CacheAction,
}

/// Cache subcommands
#[derive(Subcommand, Debug)]
pub enum CacheAction {
    /// List installed packages and their sizes
    Info {
        /// Output format
        #[arg(short, long, default_value = "table")]
        format: OutputFormat,
    },

    /// Remove installed packages from the cache
    Clear {
        /// Clear only this package (all versions)
        #[arg(long)]
        package: Option<String>,

        /// Skip confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

/// Arguments for the config command
#[derive(Parser, Debug)]
pub struct ConfigArgs {
    /// Subcommand for config
    #[command(subcommand)]
    pub action: Option<ConfigAction>,
}

/// Config subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Show configuration file path
    Path,

    /// Initialize default configuration
    Init {
        /// Overwrite existing configuration
        #[arg(short, long)]
        force: bool,
    },

    /// Set a configuration value
    Set {
        /// Configuration key (e.g. core.version)
        key: String,
        /// Value to set
        value: String,
    },
}

/// Output format for listings
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable table
    Table,
    /// JSON output
    Json,
    /// Simple text (one per line)
    Plain,
}
