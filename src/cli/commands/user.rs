//! User command handlers

use crate::config::Config;
use crate::entities::users::Role;
use crate::models::password;
use crate::models::user::{NewUser, UserUpdate};
use crate::services::{ClosetService, SeaOrmClosetService};

use super::{open_store, read_password, require_user};

pub async fn cmd_user_add(
    config: &Config,
    new_user: NewUser,
    password: Option<String>,
) -> anyhow::Result<()> {
    let store = open_store(config).await?;
    let service = SeaOrmClosetService::new(store);

    let new_user = NewUser {
        password: read_password(password)?,
        ..new_user
    };

    let user = service.register(new_user).await?;
    println!(
        "Created {} (id {}, role {})",
        user.username, user.id, user.role
    );
    Ok(())
}

pub async fn cmd_user_list(config: &Config) -> anyhow::Result<()> {
    let store = open_store(config).await?;
    let users = store.list_users().await?;

    if users.is_empty() {
        println!("No users yet.");
        println!();
        println!("Add one with: closet user add <username> --email <email> --first-name <name>");
        return Ok(());
    }

    println!("Users ({} total)", users.len());
    println!("{:-<70}", "");

    for user in users {
        let full_name = match &user.last_name {
            Some(last) => format!("{} {last}", user.first_name),
            None => user.first_name.clone(),
        };
        let items = store.count_catalog_items_for_user(user.id).await.unwrap_or(0);

        println!("{:>4}  {:<20} {:<6} {}", user.id, user.username, user.role, full_name);
        println!("      {} | {} item(s)", user.email, items);
    }

    Ok(())
}

pub async fn cmd_user_passwd(
    config: &Config,
    username: &str,
    password: Option<String>,
) -> anyhow::Result<()> {
    let store = open_store(config).await?;
    let user = require_user(&store, username).await?;

    let password = read_password(password)?;
    password::check_strength(&password)?;
    store.set_user_password(user.id, &password).await?;

    println!("Password updated for {}", user.username);
    Ok(())
}

pub async fn cmd_user_role(config: &Config, username: &str, role: Role) -> anyhow::Result<()> {
    let store = open_store(config).await?;
    let user = require_user(&store, username).await?;

    if user.role == role {
        println!("{} is already {role}", user.username);
        return Ok(());
    }

    store
        .update_user(
            user.id,
            UserUpdate {
                role: Some(role),
                ..Default::default()
            },
        )
        .await?;

    println!("{} is now {role}", user.username);
    Ok(())
}
