pub mod prelude;

pub mod actions;
pub mod catalog;
pub mod users;

use sea_orm::ActiveEnum;

/// A text value that is not a member of one of the closed enumerations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("'{value}' is not a valid {field}")]
pub struct InvalidValue {
    pub field: &'static str,
    pub value: String,
}

pub(crate) fn parse_active_enum<E>(field: &'static str, s: &str) -> Result<E, InvalidValue>
where
    E: ActiveEnum<Value = String>,
{
    E::try_from_value(&s.to_string()).map_err(|_| InvalidValue {
        field,
        value: s.to_string(),
    })
}
