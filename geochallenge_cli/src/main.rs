mod cli;
mod display;
mod error;

use std::path::Path;

use clap::Parser;
use cli::{Cli, RunCommand};
use error::GeoChallengeCliResult;
use geochallenge::config::Config;
use log::debug;

const DEFAULT_LOGGING_LEVEL: &str = "warn";

#[tokio::main]
async fn main() -> GeoChallengeCliResult<()> {
    // Set RUST_LOG to `DEFAULT_LOGGING_LEVEL` if not set
    let _ =
        std::env::var("RUST_LOG").map_err(|_| std::env::set_var("RUST_LOG", DEFAULT_LOGGING_LEVEL));
    pretty_env_logger::init_timed();
    let args = Cli::parse();
    debug!("args: {args:?}");
    let config = match dirs::config_dir() {
        // macOS: ~/Library/Application Support/geochallenge/config.toml
        Some(dir) => read_config_from_toml(&dir.join("geochallenge").join("config.toml"))?,
        None => Config::default(),
    };
    debug!("config: {config:?}");

    if let Some(command) = args.command {
        command.run(config).await?;
    }
    Ok(())
}

/// Reads the configuration file, or the defaults when there is none.
fn read_config_from_toml(file_path: &Path) -> GeoChallengeCliResult<Config> {
    match std::fs::read_to_string(file_path) {
        Ok(contents) => Ok(toml::from_str(&contents)?),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Config::default()),
        Err(e) => Err(e.into()),
    }
}
