use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set, sea_query::Expr,
};

use crate::entities::catalog;
use crate::models::catalog::{CatalogUpdate, NewCatalogItem};

pub type CatalogItem = catalog::Model;

pub struct CatalogRepository {
    conn: DatabaseConnection,
}

impl CatalogRepository {
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn add(&self, item: NewCatalogItem) -> Result<CatalogItem> {
        let mut active = catalog::ActiveModel {
            name: Set(item.name),
            category: Set(item.category),
            color: Set(item.color),
            size: Set(item.size),
            user_id: Set(item.user_id),
            ..Default::default()
        };

        // Unset columns are filled by the entity's defaults on insert.
        if let Some(img_name) = item.img_name {
            active.img_name = Set(img_name);
        }
        if let Some(priority) = item.priority {
            active.priority = Set(priority);
        }

        active
            .insert(&self.conn)
            .await
            .context("Failed to insert catalog item")
    }

    pub async fn get(&self, id: i32) -> Result<Option<CatalogItem>> {
        catalog::Entity::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query catalog item")
    }

    /// A user's closet, evaluated when called. Highest priority first.
    pub async fn find_for_user(&self, user_id: i32) -> Result<Vec<CatalogItem>> {
        catalog::Entity::find()
            .filter(catalog::Column::UserId.eq(user_id))
            .order_by_asc(catalog::Column::Priority)
            .order_by_asc(catalog::Column::Id)
            .all(&self.conn)
            .await
            .context("Failed to query closet")
    }

    pub async fn count_for_user(&self, user_id: i32) -> Result<u64> {
        catalog::Entity::find()
            .filter(catalog::Column::UserId.eq(user_id))
            .count(&self.conn)
            .await
            .context("Failed to count closet items")
    }

    pub async fn update(&self, id: i32, update: CatalogUpdate) -> Result<Option<CatalogItem>> {
        let Some(item) = self.get(id).await? else {
            return Ok(None);
        };

        if update.is_empty() {
            return Ok(Some(item));
        }

        let mut active: catalog::ActiveModel = item.into();
        if let Some(name) = update.name {
            active.name = Set(name);
        }
        if let Some(img_name) = update.img_name {
            active.img_name = Set(img_name);
        }
        if let Some(category) = update.category {
            active.category = Set(category);
        }
        if let Some(color) = update.color {
            active.color = Set(color);
        }
        if let Some(size) = update.size {
            active.size = Set(size);
        }
        if let Some(priority) = update.priority {
            active.priority = Set(priority);
        }

        let model = active
            .update(&self.conn)
            .await
            .context("Failed to update catalog item")?;

        Ok(Some(model))
    }

    /// Count one more wear and stamp the time.
    pub async fn record_wear(&self, id: i32, worn_at: DateTime<Utc>) -> Result<Option<CatalogItem>> {
        let result = catalog::Entity::update_many()
            .col_expr(
                catalog::Column::TimesWorn,
                Expr::col(catalog::Column::TimesWorn).add(1),
            )
            .col_expr(catalog::Column::LastWorn, Expr::value(worn_at))
            .filter(catalog::Column::Id.eq(id))
            .exec(&self.conn)
            .await
            .context("Failed to record wear")?;

        if result.rows_affected == 0 {
            return Ok(None);
        }

        self.get(id).await
    }

    pub async fn delete(&self, id: i32) -> Result<bool> {
        let result = catalog::Entity::delete_by_id(id)
            .exec(&self.conn)
            .await
            .context("Failed to delete catalog item")?;

        Ok(result.rows_affected > 0)
    }
}
