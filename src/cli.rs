//! CLI argument parsing and command dispatch

use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};

use crate::commands;

/// Preset Repository - Check out preset repositories and render their flags
#[derive(Parser, Debug)]
#[command(name = "preset-repo")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,

    #[command(flatten)]
    global: GlobalArgs,

    /// Set log level (error, warn, info, debug, trace)
    #[arg(
        long,
        global = true,
        value_name = "LEVEL",
        default_value = "warn",
        value_parser = ["error", "warn", "info", "debug", "trace"]
    )]
    log_level: String,
}

/// Options shared by every subcommand
#[derive(Args, Debug, Clone)]
pub struct GlobalArgs {
    /// Path to config file
    #[arg(
        short,
        long,
        global = true,
        value_name = "PATH",
        env = "PRESET_REPO_CONFIG",
        default_value = preset_repo::defaults::CONFIG_FILE_NAME
    )]
    pub config: PathBuf,

    /// Cache root directory
    ///
    /// Overrides `cache_root` from the config file. Defaults to the system's
    /// cache directory (e.g., `~/.cache/preset-repo` on Linux).
    #[arg(long, global = true, value_name = "DIR", env = "PRESET_REPO_CACHE")]
    pub cache_root: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Check out every configured repository
    Fetch(commands::fetch::FetchArgs),

    /// Check out and scan repositories for preset templates
    Scan(commands::scan::ScanArgs),

    /// Render the flag statements of a preset selection
    Flags(commands::flags::FlagsArgs),

    /// Manage the checkout cache
    Cache(commands::cache::CacheArgs),

    /// Generate shell completion scripts
    Completions(commands::completions::CompletionsArgs),
}

impl Cli {
    /// Execute the CLI command
    pub fn execute(self) -> Result<()> {
        init_logging(&self.log_level);

        match self.command {
            Commands::Fetch(args) => commands::fetch::execute(args, &self.global),
            Commands::Scan(args) => commands::scan::execute(args, &self.global),
            Commands::Flags(args) => commands::flags::execute(args, &self.global),
            Commands::Cache(args) => commands::cache::execute(args, &self.global),
            Commands::Completions(args) => commands::completions::execute(args),
        }
    }
}

/// `RUST_LOG` wins over `--log-level` when set.
fn init_logging(level: &str) {
    let env = env_logger::Env::default().default_filter_or(level);
    // A logger may already be installed when running under a test harness
    let _ = env_logger::Builder::from_env(env)
        .format_timestamp(None)
        .format_target(false)
        .try_init();
}
