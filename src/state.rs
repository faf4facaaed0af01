use std::sync::Arc;

use tracing::info;

use crate::config::Config;
use crate::db::Store;
use crate::services::{ClosetService, SeaOrmClosetService};

/// Everything a request handler or CLI command needs, built once at startup.
#[derive(Clone)]
pub struct SharedState {
    pub config: Arc<Config>,

    pub store: Store,

    pub closet_service: Arc<dyn ClosetService>,
}

impl SharedState {
    /// Validate the config, open the database (migrating it when
    /// `general.auto_migrate` is set) and wire up the services.
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        config.validate()?;

        let store = Store::from_config(&config).await?;
        let closet_service: Arc<dyn ClosetService> =
            Arc::new(SeaOrmClosetService::new(store.clone()));

        info!(database = %config.general.database_path, "Application state ready");

        Ok(Self {
            config: Arc::new(config),
            store,
            closet_service,
        })
    }

    #[must_use]
    pub fn closet(&self) -> &Arc<dyn ClosetService> {
        &self.closet_service
    }
}
