use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, Statement};
use sea_orm_migration::MigratorTrait;
use std::path::Path;
use std::time::Duration;
use tracing::info;

use crate::config::{Config, SecurityConfig};
use crate::models::action::{ActionFilter, NewAction};
use crate::models::catalog::{CatalogUpdate, NewCatalogItem};
use crate::models::user::{NewUser, User, UserUpdate};

pub mod constraint;
pub mod migrator;
pub mod repositories;

pub use constraint::{ConstraintKind, constraint_violation};
pub use repositories::action::ActionRecord;
pub use repositories::catalog::CatalogItem;

/// Name and applied state of one schema migration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationState {
    pub name: String,
    pub applied: bool,
}

/// The database binding: a pooled connection plus the schema migrator.
#[derive(Clone)]
pub struct Store {
    pub conn: DatabaseConnection,
    security: Option<SecurityConfig>,
}

impl Store {
    /// Connect and apply pending migrations with default pool settings.
    pub async fn new(db_url: &str) -> Result<Self> {
        let store = Self::connect(db_url, 5, 1).await?;
        store.migrate_up().await?;
        Ok(store)
    }

    pub async fn from_config(config: &Config) -> Result<Self> {
        let mut store = Self::connect(
            &config.general.database_path,
            config.general.max_db_connections,
            config.general.min_db_connections,
        )
        .await?;
        store.security = Some(config.security.clone());

        if config.general.auto_migrate {
            store.migrate_up().await?;
        }

        Ok(store)
    }

    pub async fn connect(
        db_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self> {
        let in_memory = db_url.contains(":memory:");

        if !in_memory {
            ensure_database_file(db_url)?;
        }

        let mut opt = ConnectOptions::new(db_url.to_string());
        opt.connect_timeout(Duration::from_secs(10))
            .acquire_timeout(Duration::from_secs(10))
            .sqlx_logging(false);

        // Every in-memory connection is its own database, so keep exactly one alive.
        if in_memory {
            opt.max_connections(1).min_connections(1);
        } else {
            opt.max_connections(max_connections)
                .min_connections(min_connections)
                .idle_timeout(Duration::from_secs(300))
                .max_lifetime(Duration::from_secs(600));
        }

        let conn = Database::connect(opt)
            .await
            .with_context(|| format!("Failed to connect to database: {db_url}"))?;

        info!(
            "Database connected (pool: {}-{})",
            min_connections, max_connections
        );

        Ok(Self {
            conn,
            security: None,
        })
    }

    pub async fn ping(&self) -> Result<()> {
        let backend = self.conn.get_database_backend();
        self.conn
            .query_one(Statement::from_string(backend, "SELECT 1".to_string()))
            .await?;
        Ok(())
    }

    pub async fn migrate_up(&self) -> Result<()> {
        migrator::Migrator::up(&self.conn, None)
            .await
            .context("Failed to apply migrations")?;
        info!("Database migrations applied");
        Ok(())
    }

    /// Roll back the last `steps` migrations, or all of them when `None`.
    pub async fn migrate_down(&self, steps: Option<u32>) -> Result<()> {
        migrator::Migrator::down(&self.conn, steps)
            .await
            .context("Failed to roll back migrations")?;
        info!("Database migrations rolled back");
        Ok(())
    }

    /// Drop every table and re-apply all migrations.
    pub async fn migrate_fresh(&self) -> Result<()> {
        migrator::Migrator::fresh(&self.conn)
            .await
            .context("Failed to rebuild schema")?;
        info!("Database schema rebuilt");
        Ok(())
    }

    pub async fn migration_states(&self) -> Result<Vec<MigrationState>> {
        let applied = migrator::Migrator::get_applied_migrations(&self.conn)
            .await
            .context("Failed to read applied migrations")?
            .into_iter()
            .map(|m| m.name().to_string())
            .collect::<Vec<_>>();

        Ok(migrator::Migrator::migrations()
            .into_iter()
            .map(|m| {
                let name = m.name().to_string();
                let applied = applied.contains(&name);
                MigrationState { name, applied }
            })
            .collect())
    }

    // ========== User Repository Methods ==========

    #[must_use]
    pub fn user_repo(&self) -> repositories::user::UserRepository {
        repositories::user::UserRepository::new(self.conn.clone(), self.security.clone())
    }

    fn catalog_repo(&self) -> repositories::catalog::CatalogRepository {
        repositories::catalog::CatalogRepository::new(self.conn.clone())
    }

    fn action_repo(&self) -> repositories::action::ActionRepository {
        repositories::action::ActionRepository::new(self.conn.clone())
    }

    pub async fn create_user(&self, new_user: NewUser) -> Result<User> {
        self.user_repo().create(new_user).await
    }

    pub async fn get_user(&self, id: i32) -> Result<Option<User>> {
        self.user_repo().get_by_id(id).await
    }

    pub async fn get_user_by_username(&self, username: &str) -> Result<Option<User>> {
        self.user_repo().get_by_username(username).await
    }

    pub async fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        self.user_repo().get_by_email(email).await
    }

    pub async fn list_users(&self) -> Result<Vec<User>> {
        self.user_repo().list().await
    }

    pub async fn verify_user_credentials(
        &self,
        username: &str,
        password: &str,
    ) -> Result<Option<User>> {
        self.user_repo()
            .verify_credentials(username, password)
            .await
    }

    pub async fn set_user_password(&self, id: i32, new_password: &str) -> Result<()> {
        self.user_repo().set_password(id, new_password).await
    }

    pub async fn update_user(&self, id: i32, update: UserUpdate) -> Result<Option<User>> {
        self.user_repo().update(id, update).await
    }

    pub async fn delete_user(&self, id: i32) -> Result<bool> {
        self.user_repo().delete(id).await
    }

    // ========== Catalog Repository Methods ==========

    pub async fn add_catalog_item(&self, item: NewCatalogItem) -> Result<CatalogItem> {
        self.catalog_repo().add(item).await
    }

    pub async fn get_catalog_item(&self, id: i32) -> Result<Option<CatalogItem>> {
        self.catalog_repo().get(id).await
    }

    /// The user's closet, queried on demand.
    pub async fn find_catalog_items_for_user(&self, user_id: i32) -> Result<Vec<CatalogItem>> {
        self.catalog_repo().find_for_user(user_id).await
    }

    pub async fn count_catalog_items_for_user(&self, user_id: i32) -> Result<u64> {
        self.catalog_repo().count_for_user(user_id).await
    }

    pub async fn update_catalog_item(
        &self,
        id: i32,
        update: CatalogUpdate,
    ) -> Result<Option<CatalogItem>> {
        self.catalog_repo().update(id, update).await
    }

    pub async fn record_wear(
        &self,
        id: i32,
        worn_at: DateTime<Utc>,
    ) -> Result<Option<CatalogItem>> {
        self.catalog_repo().record_wear(id, worn_at).await
    }

    pub async fn delete_catalog_item(&self, id: i32) -> Result<bool> {
        self.catalog_repo().delete(id).await
    }

    // ========== Action Repository Methods ==========

    pub async fn record_action(&self, action: NewAction) -> Result<ActionRecord> {
        self.action_repo().record(action).await
    }

    pub async fn get_action(&self, id: i32) -> Result<Option<ActionRecord>> {
        self.action_repo().get(id).await
    }

    pub async fn list_actions(
        &self,
        page: u64,
        page_size: u64,
        filter: &ActionFilter,
    ) -> Result<(Vec<ActionRecord>, u64)> {
        self.action_repo().list(page, page_size, filter).await
    }

    pub async fn list_all_actions(&self, filter: &ActionFilter) -> Result<Vec<ActionRecord>> {
        self.action_repo().list_all(filter).await
    }

    pub async fn prune_actions(&self, cutoff: DateTime<Utc>) -> Result<u64> {
        self.action_repo().prune_older_than(cutoff).await
    }

    pub async fn export_actions_csv(&self, filter: &ActionFilter) -> Result<String> {
        self.action_repo().export_csv(filter).await
    }
}

/// Create the `SQLite` file (and its directory) so the pool can open it.
fn ensure_database_file(db_url: &str) -> Result<()> {
    let path_str = db_url
        .trim_start_matches("sqlite://")
        .trim_start_matches("sqlite:");
    let path_str = path_str.split('?').next().unwrap_or(path_str);
    let path = Path::new(path_str);

    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent).with_context(|| {
            format!("Failed to create database directory: {}", parent.display())
        })?;
    }

    if !path.exists() {
        std::fs::File::create(path)
            .with_context(|| format!("Database path is not writable: {}", path.display()))?;
    }

    Ok(())
}
