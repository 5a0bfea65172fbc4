use anyhow::{Context, Result};

use fruitmath::config::Config;
use fruitmath::quiz::LevelBank;
use fruitmath::shell;
use fruitmath::store::Store;

#[tokio::main]
async fn main() -> Result<()> {
    // Begin logger
    env_logger::init();

    // Load configuration from .env and the environment
    let config = Config::from_env();
    log::debug!("Configuration: {config:?}");

    // Initialize data directory
    let store = Store::initialize(&config.data_dir)
        .with_context(|| format!("Could not open data directory {}", config.data_dir.display()))?;

    // Load levels, warning about any answer key that doesn't add up
    let bank = match &config.levels_file {
        Some(path) => LevelBank::load(path)?,
        None => LevelBank::builtin(),
    };
    for issue in bank.validate() {
        log::warn!("Level bank: {issue}");
    }

    shell::run_shell(config, store, bank).await
}
