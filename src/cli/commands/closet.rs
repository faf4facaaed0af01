//! Closet command handler

use crate::config::Config;

use super::{open_store, require_user};

pub async fn cmd_closet(config: &Config, username: &str) -> anyhow::Result<()> {
    let store = open_store(config).await?;
    let user = require_user(&store, username).await?;
    let items = store.find_catalog_items_for_user(user.id).await?;

    if items.is_empty() {
        println!("{}'s closet is empty.", user.username);
        return Ok(());
    }

    println!("{}'s closet ({} items)", user.username, items.len());
    println!("{:-<70}", "");

    for item in items {
        let last_worn = item
            .last_worn
            .map_or_else(|| "never".to_string(), |t| t.format("%Y-%m-%d").to_string());

        println!(
            "[{}] {} ({} {}, size {})",
            item.priority, item.name, item.color, item.category, item.size
        );
        println!(
            "    ID: {} | Worn: {} | Last worn: {} | Image: {}",
            item.id, item.times_worn, last_worn, item.img_name
        );
    }

    Ok(())
}
