//! `SeaORM` implementation of the `ClosetService` trait.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::{info, warn};

use crate::db::{CatalogItem, ConstraintKind, Store, constraint_violation};
use crate::models::action::{ActionFilter, ActionType, NewAction, Target};
use crate::models::catalog::{CatalogUpdate, NewCatalogItem};
use crate::models::password;
use crate::models::user::{NewUser, User, UserUpdate};
use crate::services::closet_service::{ActionPage, ClosetError, ClosetService};

pub struct SeaOrmClosetService {
    store: Store,
}

impl SeaOrmClosetService {
    #[must_use]
    pub const fn new(store: Store) -> Self {
        Self { store }
    }

    async fn user(&self, id: i32) -> Result<User, ClosetError> {
        self.store
            .get_user(id)
            .await?
            .ok_or(ClosetError::user_not_found(id))
    }

    async fn admin(&self, id: i32) -> Result<User, ClosetError> {
        let user = self.user(id).await?;
        if !user.is_admin() {
            return Err(ClosetError::Forbidden(format!(
                "{} is not an admin",
                user.username
            )));
        }
        Ok(user)
    }

    async fn item(&self, id: i32) -> Result<CatalogItem, ClosetError> {
        self.store
            .get_catalog_item(id)
            .await?
            .ok_or(ClosetError::item_not_found(id))
    }

    /// Decide whether `actor` may touch `item`, and which action that is.
    fn item_action(
        actor: &User,
        item: &CatalogItem,
        own: ActionType,
        admin: ActionType,
    ) -> Result<ActionType, ClosetError> {
        if item.user_id == Some(actor.id) {
            Ok(own)
        } else if actor.is_admin() {
            Ok(admin)
        } else {
            Err(ClosetError::Forbidden(format!(
                "item {} does not belong to {}",
                item.id, actor.username
            )))
        }
    }
}

fn validate_new_user(new_user: &NewUser) -> Result<(), ClosetError> {
    for (field, value) in [
        ("first_name", &new_user.first_name),
        ("username", &new_user.username),
        ("email", &new_user.email),
    ] {
        if value.trim().is_empty() {
            return Err(ClosetError::Validation(format!("{field} is required")));
        }
    }

    password::check_strength(&new_user.password)
        .map_err(|err| ClosetError::Validation(err.to_string()))
}

#[async_trait]
impl ClosetService for SeaOrmClosetService {
    async fn register(&self, new_user: NewUser) -> Result<User, ClosetError> {
        validate_new_user(&new_user)?;

        let username = new_user.username.clone();
        let email = new_user.email.clone();

        let user = self.store.create_user(new_user).await.map_err(|err| {
            match constraint_violation(&err) {
                Some(ConstraintKind::Unique) if format!("{err:#}").contains("users.email") => {
                    ClosetError::Conflict(format!("email '{email}' is already registered"))
                }
                Some(ConstraintKind::Unique) => {
                    ClosetError::Conflict(format!("username '{username}' is already taken"))
                }
                _ => ClosetError::from(err),
            }
        })?;

        info!(user_id = user.id, username = %user.username, "User registered");
        Ok(user)
    }

    async fn login(&self, username: &str, password: &str) -> Result<User, ClosetError> {
        let Some(user) = self
            .store
            .verify_user_credentials(username, password)
            .await?
        else {
            warn!(username = %username, "Failed login attempt");
            return Err(ClosetError::InvalidCredentials);
        };

        self.store
            .record_action(NewAction::new(ActionType::Login, user.id).target(Target::User(user.id)))
            .await?;

        Ok(user)
    }

    async fn closet(&self, user_id: i32) -> Result<Vec<CatalogItem>, ClosetError> {
        let user = self.user(user_id).await?;
        Ok(self.store.find_catalog_items_for_user(user.id).await?)
    }

    async fn add_item(
        &self,
        actor_id: i32,
        item: NewCatalogItem,
    ) -> Result<CatalogItem, ClosetError> {
        let actor = self.user(actor_id).await?;
        if item.name.trim().is_empty() {
            return Err(ClosetError::Validation("name is required".to_string()));
        }

        let item = self.store.add_catalog_item(item.owned_by(actor.id)).await?;

        self.store
            .record_action(
                NewAction::new(ActionType::AddItem, actor.id).target(Target::Catalog(item.id)),
            )
            .await?;

        info!(item_id = item.id, user_id = actor.id, "Catalog item added");
        Ok(item)
    }

    async fn edit_item(
        &self,
        actor_id: i32,
        item_id: i32,
        update: CatalogUpdate,
        details: Option<String>,
    ) -> Result<CatalogItem, ClosetError> {
        let actor = self.user(actor_id).await?;
        let item = self.item(item_id).await?;
        let action_type =
            Self::item_action(&actor, &item, ActionType::EditItem, ActionType::AdminEditItem)?;

        let item = self
            .store
            .update_catalog_item(item_id, update)
            .await?
            .ok_or(ClosetError::item_not_found(item_id))?;

        self.store
            .record_action(
                NewAction::new(action_type, actor.id)
                    .target(Target::Catalog(item.id))
                    .details(details),
            )
            .await?;

        Ok(item)
    }

    async fn delete_item(
        &self,
        actor_id: i32,
        item_id: i32,
        details: Option<String>,
    ) -> Result<(), ClosetError> {
        let actor = self.user(actor_id).await?;
        let item = self.item(item_id).await?;
        let action_type = Self::item_action(
            &actor,
            &item,
            ActionType::DeleteItem,
            ActionType::AdminDeleteItem,
        )?;

        if !self.store.delete_catalog_item(item_id).await? {
            return Err(ClosetError::item_not_found(item_id));
        }

        self.store
            .record_action(
                NewAction::new(action_type, actor.id)
                    .target(Target::Catalog(item_id))
                    .details(details),
            )
            .await?;

        info!(item_id, user_id = actor.id, "Catalog item deleted");
        Ok(())
    }

    async fn wear_item(&self, actor_id: i32, item_id: i32) -> Result<CatalogItem, ClosetError> {
        let actor = self.user(actor_id).await?;
        let item = self.item(item_id).await?;
        if item.user_id != Some(actor.id) {
            return Err(ClosetError::Forbidden(format!(
                "item {item_id} does not belong to {}",
                actor.username
            )));
        }

        self.store
            .record_wear(item_id, Utc::now())
            .await?
            .ok_or(ClosetError::item_not_found(item_id))
    }

    async fn admin_edit_user(
        &self,
        admin_id: i32,
        user_id: i32,
        update: UserUpdate,
        details: Option<String>,
    ) -> Result<User, ClosetError> {
        let admin = self.admin(admin_id).await?;

        let user = self
            .store
            .update_user(user_id, update)
            .await?
            .ok_or(ClosetError::user_not_found(user_id))?;

        self.store
            .record_action(
                NewAction::new(ActionType::AdminEditUser, admin.id)
                    .target(Target::User(user.id))
                    .details(details),
            )
            .await?;

        Ok(user)
    }

    async fn list_actions(
        &self,
        admin_id: i32,
        page: u64,
        page_size: u64,
        filter: ActionFilter,
    ) -> Result<ActionPage, ClosetError> {
        self.admin(admin_id).await?;

        let page = page.max(1);
        let (actions, total_pages) = self.store.list_actions(page, page_size, &filter).await?;

        Ok(ActionPage {
            actions,
            page,
            total_pages,
        })
    }

    async fn prune_logs(&self, admin_id: i32, cutoff: DateTime<Utc>) -> Result<u64, ClosetError> {
        let admin = self.admin(admin_id).await?;

        let removed = self.store.prune_actions(cutoff).await?;

        self.store
            .record_action(
                NewAction::new(ActionType::AdminPruneLog, admin.id).details(Some(format!(
                    "Removed {removed} entries older than {}",
                    cutoff.to_rfc3339()
                ))),
            )
            .await?;

        info!(removed, cutoff = %cutoff, "Audit log pruned");
        Ok(removed)
    }

    async fn export_logs_csv(
        &self,
        admin_id: i32,
        filter: ActionFilter,
    ) -> Result<String, ClosetError> {
        let admin = self.admin(admin_id).await?;

        let csv = self.store.export_actions_csv(&filter).await?;

        self.store
            .record_action(NewAction::new(ActionType::ExportLogs, admin.id))
            .await?;

        Ok(csv)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::catalog::{Category, Color};
    use crate::entities::users::Role;

    fn user(id: i32, role: Role) -> User {
        User {
            id,
            first_name: "Test".to_string(),
            last_name: None,
            username: format!("user{id}"),
            email: format!("user{id}@example.com"),
            role,
        }
    }

    fn item(id: i32, owner: i32) -> CatalogItem {
        CatalogItem {
            id,
            name: "Blue Shirt".to_string(),
            img_name: "def.png".to_string(),
            category: Category::Shirt,
            color: Color::Blue,
            size: "M".to_string(),
            times_worn: 0,
            last_worn: None,
            priority: 3,
            user_id: Some(owner),
        }
    }

    #[test]
    fn test_owner_gets_plain_action() {
        let kind = SeaOrmClosetService::item_action(
            &user(1, Role::Basic),
            &item(10, 1),
            ActionType::EditItem,
            ActionType::AdminEditItem,
        )
        .unwrap();
        assert_eq!(kind, ActionType::EditItem);
    }

    #[test]
    fn test_admin_override_on_foreign_item() {
        let kind = SeaOrmClosetService::item_action(
            &user(2, Role::Admin),
            &item(10, 1),
            ActionType::DeleteItem,
            ActionType::AdminDeleteItem,
        )
        .unwrap();
        assert_eq!(kind, ActionType::AdminDeleteItem);
    }

    #[test]
    fn test_basic_user_cannot_touch_foreign_item() {
        let err = SeaOrmClosetService::item_action(
            &user(3, Role::Basic),
            &item(10, 1),
            ActionType::EditItem,
            ActionType::AdminEditItem,
        )
        .unwrap_err();
        assert!(matches!(err, ClosetError::Forbidden(_)));
    }

    #[test]
    fn test_validate_new_user() {
        let mut new_user = NewUser {
            first_name: "Ada".to_string(),
            last_name: None,
            username: "ada99".to_string(),
            email: "ada@example.com".to_string(),
            password: "long enough".to_string(),
            role: None,
        };
        assert!(validate_new_user(&new_user).is_ok());

        new_user.password = "short".to_string();
        assert!(matches!(
            validate_new_user(&new_user),
            Err(ClosetError::Validation(_))
        ));

        new_user.password = "long enough".to_string();
        new_user.username = "   ".to_string();
        assert!(matches!(
            validate_new_user(&new_user),
            Err(ClosetError::Validation(_))
        ));
    }
}
