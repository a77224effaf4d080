//! Create subscription table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Subscription::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Subscription::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Subscription::UserId).integer().not_null())
                    .col(ColumnDef::new(Subscription::AuthorId).integer().not_null())
                    .col(
                        ColumnDef::new(Subscription::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    // No self-subscription
                    .check(Expr::col(Subscription::UserId).ne(Expr::col(Subscription::AuthorId)))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_subscription_user")
                            .from(Subscription::Table, Subscription::UserId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_subscription_author")
                            .from(Subscription::Table, Subscription::AuthorId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Unique index: (user_id, author_id) - prevent duplicate subscriptions
        manager
            .create_index(
                Index::create()
                    .name("idx_subscription_user_author")
                    .table(Subscription::Table)
                    .col(Subscription::UserId)
                    .col(Subscription::AuthorId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // Index: author_id
        manager
            .create_index(
                Index::create()
                    .name("idx_subscription_author_id")
                    .table(Subscription::Table)
                    .col(Subscription::AuthorId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Subscription::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Subscription {
    Table,
    Id,
    UserId,
    AuthorId,
    CreatedAt,
}

#[derive(Iden)]
enum User {
    Table,
    Id,
}
