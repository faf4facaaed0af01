use sea_orm::ActiveValue::Set;
use sea_orm::entity::prelude::*;
use serde::Serialize;

use crate::models::action::{ActionType, Target};

/// Append-only audit log entry.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "actions")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    #[sea_orm(indexed)]
    pub timestamp: DateTimeUtc,

    /// Free text. Known values are the `ActionType` labels.
    #[sea_orm(indexed)]
    pub action_type: String,

    pub user_id: Option<i32>,

    pub target_type: Option<String>,

    pub target_id: Option<i32>,

    pub details: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::UserId",
        to = "super::users::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    Actor,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Actor.def()
    }
}

#[async_trait::async_trait]
impl ActiveModelBehavior for ActiveModel {
    async fn before_save<C>(mut self, _db: &C, insert: bool) -> Result<Self, DbErr>
    where
        C: ConnectionTrait,
    {
        if insert && self.timestamp.is_not_set() {
            self.timestamp = Set(chrono::Utc::now());
        }
        Ok(self)
    }
}

impl Model {
    #[must_use]
    pub fn kind(&self) -> ActionType {
        ActionType::from_label(&self.action_type)
    }

    #[must_use]
    pub fn target(&self) -> Option<Target> {
        Target::from_parts(self.target_type.as_deref(), self.target_id)
    }
}
