use serde::Deserialize;

use crate::entities::catalog::{Category, Color};

/// Input for a new closet item. Unset optional columns take their defaults.
#[derive(Debug, Clone, Deserialize)]
pub struct NewCatalogItem {
    pub name: String,
    #[serde(default)]
    pub img_name: Option<String>,
    pub category: Category,
    pub color: Color,
    pub size: String,
    #[serde(default)]
    pub priority: Option<i32>,
    #[serde(default)]
    pub user_id: Option<i32>,
}

impl NewCatalogItem {
    pub fn new(
        name: impl Into<String>,
        category: Category,
        color: Color,
        size: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            img_name: None,
            category,
            color,
            size: size.into(),
            priority: None,
            user_id: None,
        }
    }

    #[must_use]
    pub fn owned_by(mut self, user_id: i32) -> Self {
        self.user_id = Some(user_id);
        self
    }

    #[must_use]
    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = Some(priority);
        self
    }

    #[must_use]
    pub fn with_image(mut self, img_name: impl Into<String>) -> Self {
        self.img_name = Some(img_name.into());
        self
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CatalogUpdate {
    pub name: Option<String>,
    pub img_name: Option<String>,
    pub category: Option<Category>,
    pub color: Option<Color>,
    pub size: Option<String>,
    pub priority: Option<i32>,
}

impl CatalogUpdate {
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.img_name.is_none()
            && self.category.is_none()
            && self.color.is_none()
            && self.size.is_none()
            && self.priority.is_none()
    }
}
