use sea_orm::ActiveValue::Set;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub const DEFAULT_IMG_NAME: &str = "def.png";
pub const DEFAULT_PRIORITY: i32 = 3;
pub const HIGHEST_PRIORITY: i32 = 1;
pub const LOWEST_PRIORITY: i32 = 5;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
pub enum Category {
    #[sea_orm(string_value = "Bra")]
    Bra,
    #[sea_orm(string_value = "Hat")]
    Hat,
    #[sea_orm(string_value = "Outerwear")]
    Outerwear,
    #[sea_orm(string_value = "Pants")]
    Pants,
    #[sea_orm(string_value = "Shirt")]
    Shirt,
    #[sea_orm(string_value = "Shoes")]
    Shoes,
    #[sea_orm(string_value = "Shorts")]
    Shorts,
    #[sea_orm(string_value = "Socks")]
    Socks,
    #[sea_orm(string_value = "Underwear")]
    Underwear,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
pub enum Color {
    #[sea_orm(string_value = "Black")]
    Black,
    #[sea_orm(string_value = "White")]
    White,
    #[sea_orm(string_value = "Gray")]
    Gray,
    #[sea_orm(string_value = "Brown")]
    Brown,
    #[sea_orm(string_value = "Tan")]
    Tan,
    #[sea_orm(string_value = "Red")]
    Red,
    #[sea_orm(string_value = "Orange")]
    Orange,
    #[sea_orm(string_value = "Yellow")]
    Yellow,
    #[sea_orm(string_value = "Green")]
    Green,
    #[sea_orm(string_value = "Blue")]
    Blue,
    #[sea_orm(string_value = "Purple")]
    Purple,
    #[sea_orm(string_value = "Pink")]
    Pink,
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_value())
    }
}

impl FromStr for Category {
    type Err = super::InvalidValue;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        super::parse_active_enum("category", s)
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_value())
    }
}

impl FromStr for Color {
    type Err = super::InvalidValue;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        super::parse_active_enum("color", s)
    }
}

/// A single clothing item in a user's closet.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "catalog")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    #[sea_orm(indexed)]
    pub name: String,

    #[sea_orm(indexed)]
    pub img_name: String,

    pub category: Category,

    pub color: Color,

    /// Alphabetic ("M") or numeric ("32") sizes.
    #[sea_orm(indexed)]
    pub size: String,

    #[sea_orm(indexed)]
    pub times_worn: i32,

    #[sea_orm(indexed)]
    pub last_worn: Option<DateTimeUtc>,

    /// 1 (highest) to 5 (lowest).
    #[sea_orm(indexed)]
    pub priority: i32,

    pub user_id: Option<i32>,
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
    Owner,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Owner.def()
    }
}

#[async_trait::async_trait]
impl ActiveModelBehavior for ActiveModel {
    async fn before_save<C>(mut self, _db: &C, insert: bool) -> Result<Self, DbErr>
    where
        C: ConnectionTrait,
    {
        if insert {
            if self.img_name.is_not_set() {
                self.img_name = Set(DEFAULT_IMG_NAME.to_string());
            }
            if self.times_worn.is_not_set() {
                self.times_worn = Set(0);
            }
            if self.priority.is_not_set() {
                self.priority = Set(DEFAULT_PRIORITY);
            }
        }
        Ok(self)
    }
}
