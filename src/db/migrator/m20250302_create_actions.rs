use sea_orm_migration::prelude::*;

use super::m20250301_create_users::Users;
use crate::models::action::MAX_DETAILS_LEN;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        #[allow(clippy::cast_possible_truncation)]
        let details_len = MAX_DETAILS_LEN as u32;

        manager
            .create_table(
                Table::create()
                    .table(Actions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Actions::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Actions::Timestamp)
                            .timestamp_with_time_zone()
                            .not_null()
                            // Same RFC 3339 text the ORM writes, so raw inserts sort and compare with it
                            .default(Expr::cust(
                                "(strftime('%Y-%m-%dT%H:%M:%f+00:00', 'now'))",
                            )),
                    )
                    .col(ColumnDef::new(Actions::ActionType).string_len(50).not_null())
                    .col(ColumnDef::new(Actions::UserId).integer().null())
                    .col(ColumnDef::new(Actions::TargetType).string_len(50).null())
                    .col(ColumnDef::new(Actions::TargetId).integer().null())
                    .col(ColumnDef::new(Actions::Details).string_len(details_len).null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_actions_user_id")
                            .from(Actions::Table, Actions::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::NoAction)
                            .on_update(ForeignKeyAction::NoAction),
                    )
                    .to_owned(),
            )
            .await?;

        // Sorting/filtering for the log viewer and prune
        for (name, col) in [
            ("idx_actions_timestamp", Actions::Timestamp),
            ("idx_actions_action_type", Actions::ActionType),
            ("idx_actions_user_id", Actions::UserId),
        ] {
            manager
                .create_index(
                    Index::create()
                        .name(name)
                        .table(Actions::Table)
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
            .drop_table(Table::drop().table(Actions::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Actions {
    Table,
    Id,
    Timestamp,
    ActionType,
    UserId,
    TargetType,
    TargetId,
    Details,
}
