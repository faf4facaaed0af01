use sea_orm::ActiveValue::Set;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::config::SecurityConfig;
use crate::models::password;

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(8))")]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    #[sea_orm(string_value = "basic")]
    Basic,
    #[sea_orm(string_value = "admin")]
    Admin,
}

impl Role {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Basic => "basic",
            Self::Admin => "admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = super::InvalidValue;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        super::parse_active_enum("role", s)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub first_name: String,

    pub last_name: Option<String>,

    #[sea_orm(unique, indexed)]
    pub username: String,

    #[sea_orm(unique)]
    pub email: String,

    /// Argon2id PHC string. Written only through `set_password`.
    pub password_hash: Option<String>,

    #[sea_orm(indexed)]
    pub role: Role,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::catalog::Entity")]
    Closet,
    #[sea_orm(has_many = "super::actions::Entity")]
    Actions,
}

impl Related<super::catalog::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Closet.def()
    }
}

impl Related<super::actions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Actions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Salt, hash and store `raw` with the default Argon2 parameters.
    pub fn set_password(&mut self, raw: &str) -> anyhow::Result<()> {
        self.password_hash = Some(password::hash_password(raw, None)?);
        Ok(())
    }

    /// Verify `raw` against the stored hash. A user without a hash never matches.
    #[must_use]
    pub fn check_password(&self, raw: &str) -> bool {
        self.password_hash
            .as_deref()
            .is_some_and(|hash| password::verify_password(raw, hash))
    }

    #[must_use]
    pub const fn is_admin(&self) -> bool {
        matches!(self.role, Role::Admin)
    }
}

impl ActiveModel {
    /// Salt and hash `raw` into the pending `password_hash` column.
    pub fn set_password(
        &mut self,
        raw: &str,
        config: Option<&SecurityConfig>,
    ) -> anyhow::Result<()> {
        self.password_hash = Set(Some(password::hash_password(raw, config)?));
        Ok(())
    }
}
