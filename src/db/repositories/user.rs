use anyhow::{Context, Result};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};
use tokio::task;

use crate::config::SecurityConfig;
use crate::entities::users;
use crate::models::user::{NewUser, User, UserUpdate};

pub struct UserRepository {
    conn: DatabaseConnection,
    security: Option<SecurityConfig>,
}

impl UserRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection, security: Option<SecurityConfig>) -> Self {
        Self { conn, security }
    }

    /// Insert a new user, hashing the password off the async runtime.
    pub async fn create(&self, new_user: NewUser) -> Result<User> {
        let NewUser {
            first_name,
            last_name,
            username,
            email,
            password,
            role,
        } = new_user;

        let security = self.security.clone();
        let active = task::spawn_blocking(move || {
            let mut active = users::ActiveModel {
                first_name: Set(first_name),
                last_name: Set(last_name),
                username: Set(username),
                email: Set(email),
                role: Set(role.unwrap_or_default()),
                ..Default::default()
            };
            active.set_password(&password, security.as_ref())?;
            Ok::<_, anyhow::Error>(active)
        })
        .await
        .context("Password hashing task panicked")??;

        let model = active
            .insert(&self.conn)
            .await
            .context("Failed to insert user")?;

        Ok(User::from(model))
    }

    pub async fn get_by_id(&self, id: i32) -> Result<Option<User>> {
        let user = users::Entity::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query user by ID")?;

        Ok(user.map(User::from))
    }

    /// Get user by username
    pub async fn get_by_username(&self, username: &str) -> Result<Option<User>> {
        let user = users::Entity::find()
            .filter(users::Column::Username.eq(username))
            .one(&self.conn)
            .await
            .context("Failed to query user by username")?;

        Ok(user.map(User::from))
    }

    pub async fn get_by_email(&self, email: &str) -> Result<Option<User>> {
        let user = users::Entity::find()
            .filter(users::Column::Email.eq(email))
            .one(&self.conn)
            .await
            .context("Failed to query user by email")?;

        Ok(user.map(User::from))
    }

    pub async fn list(&self) -> Result<Vec<User>> {
        let users = users::Entity::find()
            .order_by_asc(users::Column::Id)
            .all(&self.conn)
            .await
            .context("Failed to list users")?;

        Ok(users.into_iter().map(User::from).collect())
    }

    /// Returns the user when `password` matches. Unknown users and users
    /// without a password both yield `None`.
    /// Note: This uses `spawn_blocking` because Argon2 hashing is CPU-intensive
    /// and would block the async runtime if run directly.
    pub async fn verify_credentials(&self, username: &str, password: &str) -> Result<Option<User>> {
        let user = users::Entity::find()
            .filter(users::Column::Username.eq(username))
            .one(&self.conn)
            .await
            .context("Failed to query user for password verification")?;

        let Some(user) = user else {
            return Ok(None);
        };

        let password = password.to_string();
        let (user, is_valid) = task::spawn_blocking(move || {
            let is_valid = user.check_password(&password);
            (user, is_valid)
        })
        .await
        .context("Password verification task panicked")?;

        Ok(is_valid.then(|| User::from(user)))
    }

    /// Replace a user's password with a freshly salted hash.
    pub async fn set_password(&self, id: i32, new_password: &str) -> Result<()> {
        let user = users::Entity::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query user for password update")?
            .ok_or_else(|| anyhow::anyhow!("User not found: {id}"))?;

        let new_password = new_password.to_string();
        let security = self.security.clone();
        let active = task::spawn_blocking(move || {
            let mut active: users::ActiveModel = user.into();
            active.set_password(&new_password, security.as_ref())?;
            Ok::<_, anyhow::Error>(active)
        })
        .await
        .context("Password hashing task panicked")??;

        active
            .update(&self.conn)
            .await
            .context("Failed to update password")?;

        Ok(())
    }

    pub async fn update(&self, id: i32, update: UserUpdate) -> Result<Option<User>> {
        let Some(user) = users::Entity::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query user for update")?
        else {
            return Ok(None);
        };

        if update.is_empty() {
            return Ok(Some(User::from(user)));
        }

        let mut active: users::ActiveModel = user.into();
        if let Some(first_name) = update.first_name {
            active.first_name = Set(first_name);
        }
        if let Some(last_name) = update.last_name {
            active.last_name = Set(last_name);
        }
        if let Some(email) = update.email {
            active.email = Set(email);
        }
        if let Some(role) = update.role {
            active.role = Set(role);
        }

        let model = active
            .update(&self.conn)
            .await
            .context("Failed to update user")?;

        Ok(Some(User::from(model)))
    }

    /// Delete a user. Fails with a foreign key violation while the user still
    /// owns catalog items or appears in the audit log.
    pub async fn delete(&self, id: i32) -> Result<bool> {
        let result = users::Entity::delete_by_id(id)
            .exec(&self.conn)
            .await
            .context("Failed to delete user")?;

        Ok(result.rows_affected > 0)
    }
}
