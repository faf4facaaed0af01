//! Init command handler

use crate::config::Config;

use super::open_store;

pub async fn cmd_init(config: &Config) -> anyhow::Result<()> {
    if Config::create_default_if_missing()? {
        println!("Created config.toml with default settings");
    } else {
        println!("config.toml already exists, leaving it untouched");
    }

    let store = open_store(config).await?;
    store.migrate_up().await?;

    println!("Database ready at {}", config.general.database_path);
    Ok(())
}
