//! Create user table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(User::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(User::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(User::Email).string_len(254).not_null())
                    .col(ColumnDef::new(User::Username).string_len(150).not_null())
                    .col(ColumnDef::new(User::FirstName).string_len(150).not_null())
                    .col(ColumnDef::new(User::LastName).string_len(150).not_null())
                    .col(ColumnDef::new(User::Avatar).string_len(512))
                    .col(ColumnDef::new(User::Password).string_len(256).not_null())
                    .col(ColumnDef::new(User::AuthToken).string_len(64))
                    .col(ColumnDef::new(User::IsStaff).boolean().not_null().default(false))
                    .col(ColumnDef::new(User::IsSuperuser).boolean().not_null().default(false))
                    .col(
                        ColumnDef::new(User::DateJoined)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        // Unique index: email (login identifier)
        manager
            .create_index(
                Index::create()
                    .name("idx_user_email")
                    .table(User::Table)
                    .col(User::Email)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // Unique index: username
        manager
            .create_index(
                Index::create()
                    .name("idx_user_username")
                    .table(User::Table)
                    .col(User::Username)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // Unique index: auth token
        manager
            .create_index(
                Index::create()
                    .name("idx_user_auth_token")
                    .table(User::Table)
                    .col(User::AuthToken)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(User::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum User {
    Table,
    Id,
    Email,
    Username,
    FirstName,
    LastName,
    Avatar,
    Password,
    AuthToken,
    IsStaff,
    IsSuperuser,
    DateJoined,
}
