mod closet;
mod init;
mod logs;
mod migrate;
mod user;

pub use closet::cmd_closet;
pub use init::cmd_init;
pub use logs::{cmd_logs_export, cmd_logs_list, cmd_logs_prune};
pub use migrate::cmd_migrate;
pub use user::{cmd_user_add, cmd_user_list, cmd_user_passwd, cmd_user_role};

use std::io::BufRead;

use crate::config::Config;
use crate::db::Store;
use crate::models::user::User;

async fn open_store(config: &Config) -> anyhow::Result<Store> {
    config.validate()?;
    Store::from_config(config).await
}

async fn require_user(store: &Store, username: &str) -> anyhow::Result<User> {
    store
        .get_user_by_username(username)
        .await?
        .ok_or_else(|| anyhow::anyhow!("No user named '{username}'"))
}

/// Use the flag value when given, otherwise read one line from stdin.
fn read_password(flag: Option<String>) -> anyhow::Result<String> {
    if let Some(password) = flag {
        return Ok(password);
    }

    eprint!("Password: ");
    let mut line = String::new();
    std::io::stdin().lock().read_line(&mut line)?;
    let password = line.trim_end_matches(['\r', '\n']).to_string();

    if password.is_empty() {
        anyhow::bail!("Password must not be empty");
    }
    Ok(password)
}
