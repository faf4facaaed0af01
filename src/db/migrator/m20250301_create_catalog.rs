use sea_orm_migration::prelude::*;

use super::enum_check;
use super::m20250301_create_users::Users;
use crate::entities::catalog::{
    Category, Color, DEFAULT_IMG_NAME, DEFAULT_PRIORITY, HIGHEST_PRIORITY, LOWEST_PRIORITY,
};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Catalog::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Catalog::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Catalog::Name).string_len(64).not_null())
                    .col(
                        ColumnDef::new(Catalog::ImgName)
                            .string_len(128)
                            .not_null()
                            .default(DEFAULT_IMG_NAME),
                    )
                    .col(
                        ColumnDef::new(Catalog::Category)
                            .string_len(16)
                            .not_null()
                            .check(enum_check::<_, Category>(Catalog::Category)),
                    )
                    .col(
                        ColumnDef::new(Catalog::Color)
                            .string_len(16)
                            .not_null()
                            .check(enum_check::<_, Color>(Catalog::Color)),
                    )
                    .col(ColumnDef::new(Catalog::Size).string_len(4).not_null())
                    .col(
                        ColumnDef::new(Catalog::TimesWorn)
                            .integer()
                            .not_null()
                            .default(0)
                            .check(Expr::col(Catalog::TimesWorn).gte(0)),
                    )
                    .col(
                        ColumnDef::new(Catalog::LastWorn)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(Catalog::Priority)
                            .integer()
                            .not_null()
                            .default(DEFAULT_PRIORITY)
                            .check(
                                Expr::col(Catalog::Priority)
                                    .between(HIGHEST_PRIORITY, LOWEST_PRIORITY),
                            ),
                    )
                    .col(ColumnDef::new(Catalog::UserId).integer().null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_catalog_user_id")
                            .from(Catalog::Table, Catalog::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::NoAction)
                            .on_update(ForeignKeyAction::NoAction),
                    )
                    .to_owned(),
            )
            .await?;

        for (name, col) in [
            ("idx_catalog_name", Catalog::Name),
            ("idx_catalog_img_name", Catalog::ImgName),
            ("idx_catalog_size", Catalog::Size),
            ("idx_catalog_times_worn", Catalog::TimesWorn),
            ("idx_catalog_last_worn", Catalog::LastWorn),
            ("idx_catalog_priority", Catalog::Priority),
            ("idx_catalog_user_id", Catalog::UserId),
        ] {
            manager
                .create_index(
                    Index::create()
                        .name(name)
                        .table(Catalog::Table)
                        .col(col)
                        .if_not_exists()
                        .to_owned(),
                )
                .await?;
        }

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Catalog::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Catalog {
    Table,
    Id,
    Name,
    ImgName,
    Category,
    Color,
    Size,
    TimesWorn,
    LastWorn,
    Priority,
    UserId,
}
