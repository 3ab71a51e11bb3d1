use std::path::PathBuf;
use std::sync::LazyLock;

use clap::Parser;

mod codebuild;
mod commands;

use anyhow::Result;
use commands::config::model::ConfigCommand;
use commands::fetch::FetchCommand;
use dirs::{config_dir, home_dir, state_dir};

/// Get the configuration file path using XDG Base Directory specification
/// Prefers XDG config location (~/.config/cblogs/config.toml) but falls back to
/// legacy location (~/.cblogs) if it exists and XDG doesn't
static CONFIG_FILE: LazyLock<PathBuf> = LazyLock::new(|| {
    let xdg_config = config_dir()
        .unwrap_or_else(|| {
            home_dir()
                .expect("HOME directory must be set to run cblogs")
                .join(".config")
        })
        .join("cblogs")
        .join("config.toml");

    // Use XDG location if it exists
    if xdg_config.exists() {
        return xdg_config;
    }

    // Otherwise check for legacy location
    let legacy_config = home_dir()
        .expect("HOME directory must be set to run cblogs")
        .join(".cblogs");

    if legacy_config.exists() {
        legacy_config
    } else {
        // Neither exists - use XDG for new installations
        xdg_config
    }
});

/// Get the state directory path using XDG Base Directory specification
/// Used for debug logs
pub fn get_state_dir() -> PathBuf {
    state_dir()
        .unwrap_or_else(|| {
            home_dir()
                .expect("HOME directory must be set to run cblogs")
                .join(".local")
                .join("state")
        })
        .join("cblogs")
}

#[derive(Parser)]
#[clap(name = "cblogs", bin_name = "cblogs", version, about)]
struct CblogsApp {
    #[clap(subcommand)]
    command: CblogsCommand,
}

#[derive(Parser)]
enum CblogsCommand {
    /// Print the full log of a CodeBuild build
    Fetch(FetchCommand),
    #[clap(subcommand)]
    Config(ConfigCommand),
}

impl CblogsApp {
    pub async fn run(&self) -> Result<()> {
        match &self.command {
            CblogsCommand::Fetch(cmd) => cmd.run().await,
            CblogsCommand::Config(cmd) => cmd.run(),
        }
    }
}

#[tokio::main]
async fn main() {
    let app = CblogsApp::parse();
    if let Err(e) = app.run().await {
        // One line on stderr, no backtrace
        eprintln!("{}", commands::error_line(&e));
        std::process::exit(commands::exit_code(&e));
    }
    std::process::exit(0);
}
