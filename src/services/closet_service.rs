//! Domain service for the tracked closet interactions.
//!
//! Every operation that has an audit log vocabulary entry writes an action
//! row after the change it describes has been stored.

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

use crate::db::{ActionRecord, CatalogItem, ConstraintKind, constraint_violation};
use crate::models::action::ActionFilter;
use crate::models::catalog::{CatalogUpdate, NewCatalogItem};
use crate::models::user::{NewUser, User, UserUpdate};

/// Errors specific to closet operations.
#[derive(Debug, Error)]
pub enum ClosetError {
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: i32 },

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("{} constraint violated: {message}", .kind.as_str())]
    Constraint {
        kind: ConstraintKind,
        message: String,
    },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ClosetError {
    pub(crate) const fn user_not_found(id: i32) -> Self {
        Self::NotFound { entity: "User", id }
    }

    pub(crate) const fn item_not_found(id: i32) -> Self {
        Self::NotFound {
            entity: "Catalog item",
            id,
        }
    }
}

impl From<sea_orm::DbErr> for ClosetError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for ClosetError {
    fn from(err: anyhow::Error) -> Self {
        match constraint_violation(&err) {
            Some(ConstraintKind::Unique) => Self::Conflict(format!("{err:#}")),
            Some(kind) => Self::Constraint {
                kind,
                message: format!("{err:#}"),
            },
            None => Self::Internal(format!("{err:#}")),
        }
    }
}

/// One page of the audit log.
#[derive(Debug, Clone, Serialize)]
pub struct ActionPage {
    pub actions: Vec<ActionRecord>,
    pub page: u64,
    pub total_pages: u64,
}

/// Domain service trait for the closet.
#[async_trait::async_trait]
pub trait ClosetService: Send + Sync {
    /// Creates an account. Duplicate usernames or emails are a
    /// [`ClosetError::Conflict`].
    async fn register(&self, new_user: NewUser) -> Result<User, ClosetError>;

    /// Verifies credentials and logs the login.
    ///
    /// # Errors
    ///
    /// Returns [`ClosetError::InvalidCredentials`] if login fails.
    async fn login(&self, username: &str, password: &str) -> Result<User, ClosetError>;

    async fn closet(&self, user_id: i32) -> Result<Vec<CatalogItem>, ClosetError>;

    /// Adds an item owned by `actor_id`.
    async fn add_item(
        &self,
        actor_id: i32,
        item: NewCatalogItem,
    ) -> Result<CatalogItem, ClosetError>;

    /// Owners edit their own items; admins may edit anyone's, which is logged
    /// as an admin override.
    async fn edit_item(
        &self,
        actor_id: i32,
        item_id: i32,
        update: CatalogUpdate,
        details: Option<String>,
    ) -> Result<CatalogItem, ClosetError>;

    async fn delete_item(
        &self,
        actor_id: i32,
        item_id: i32,
        details: Option<String>,
    ) -> Result<(), ClosetError>;

    /// Counts a wear for the owner's item. Not audited.
    async fn wear_item(&self, actor_id: i32, item_id: i32) -> Result<CatalogItem, ClosetError>;

    async fn admin_edit_user(
        &self,
        admin_id: i32,
        user_id: i32,
        update: UserUpdate,
        details: Option<String>,
    ) -> Result<User, ClosetError>;

    async fn list_actions(
        &self,
        admin_id: i32,
        page: u64,
        page_size: u64,
        filter: ActionFilter,
    ) -> Result<ActionPage, ClosetError>;

    /// Removes audit rows older than `cutoff` and returns how many were removed.
    async fn prune_logs(&self, admin_id: i32, cutoff: DateTime<Utc>) -> Result<u64, ClosetError>;

    async fn export_logs_csv(
        &self,
        admin_id: i32,
        filter: ActionFilter,
    ) -> Result<String, ClosetError>;
}
