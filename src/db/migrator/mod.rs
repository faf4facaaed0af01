use sea_orm_migration::prelude::*;

mod m20250301_create_users;
mod m20250301_create_catalog;
mod m20250302_create_actions;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250301_create_users::Migration),
            Box::new(m20250301_create_catalog::Migration),
            Box::new(m20250302_create_actions::Migration),
        ]
    }
}

/// Quoted `col IN (...)` check for a closed string enumeration.
pub(crate) fn enum_check<C, E>(col: C) -> SimpleExpr
where
    C: IntoIden + 'static,
    E: sea_orm_migration::sea_orm::ActiveEnum<Value = String>
        + sea_orm_migration::sea_orm::Iterable,
{
    Expr::col(col).is_in(E::iter().map(|variant| variant.to_value()))
}
