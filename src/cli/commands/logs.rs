//! Audit log command handlers

use std::path::Path;

use chrono::{Duration, Utc};

use crate::config::Config;
use crate::models::action::{ActionFilter, Target};
use crate::services::{ClosetService, SeaOrmClosetService};

use super::{open_store, require_user};

pub async fn cmd_logs_list(
    config: &Config,
    admin: &str,
    page: u64,
    page_size: u64,
    action_type: Option<String>,
    user: Option<&str>,
) -> anyhow::Result<()> {
    let store = open_store(config).await?;
    let admin = require_user(&store, admin).await?;

    let user_id = match user {
        Some(username) => Some(require_user(&store, username).await?.id),
        None => None,
    };

    let filter = ActionFilter {
        action_type,
        user_id,
        ..Default::default()
    };

    let service = SeaOrmClosetService::new(store);
    let page = service
        .list_actions(admin.id, page, page_size, filter)
        .await?;

    if page.actions.is_empty() {
        println!("No actions recorded.");
        return Ok(());
    }

    println!("Audit log (page {}/{})", page.page, page.total_pages);
    println!("{:-<70}", "");

    for action in page.actions {
        let actor = action
            .user_id
            .map_or_else(|| "-".to_string(), |id| id.to_string());
        let target = action
            .target()
            .map_or_else(String::new, |t: Target| match t.id() {
                Some(id) => format!(" -> {} {id}", t.kind()),
                None => format!(" -> {}", t.kind()),
            });

        println!(
            "{} #{} user {}: {}{}",
            action.timestamp.format("%Y-%m-%d %H:%M:%S"),
            action.id,
            actor,
            action.action_type,
            target
        );
        if let Some(details) = &action.details {
            println!("    {details}");
        }
    }

    Ok(())
}

pub async fn cmd_logs_export(
    config: &Config,
    admin: &str,
    output: Option<&Path>,
) -> anyhow::Result<()> {
    let store = open_store(config).await?;
    let admin = require_user(&store, admin).await?;

    let service = SeaOrmClosetService::new(store);
    let csv = service
        .export_logs_csv(admin.id, ActionFilter::default())
        .await?;

    match output {
        Some(path) => {
            std::fs::write(path, &csv)?;
            println!("Audit log written to {}", path.display());
        }
        None => print!("{csv}"),
    }

    Ok(())
}

pub async fn cmd_logs_prune(
    config: &Config,
    admin: &str,
    older_than_days: i64,
) -> anyhow::Result<()> {
    if older_than_days < 0 {
        anyhow::bail!("--older-than-days must not be negative");
    }

    let store = open_store(config).await?;
    let admin = require_user(&store, admin).await?;

    let cutoff = Utc::now() - Duration::days(older_than_days);
    let service = SeaOrmClosetService::new(store);
    let removed = service.prune_logs(admin.id, cutoff).await?;

    println!("Removed {removed} action(s) older than {older_than_days} day(s)");
    Ok(())
}
