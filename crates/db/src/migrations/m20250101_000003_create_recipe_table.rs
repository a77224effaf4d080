//! Create recipe table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Recipe::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Recipe::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Recipe::AuthorId).integer().not_null())
                    .col(ColumnDef::new(Recipe::Name).string_len(256).not_null())
                    .col(ColumnDef::new(Recipe::Image).string_len(512).not_null())
                    .col(ColumnDef::new(Recipe::Text).text().not_null())
                    .col(ColumnDef::new(Recipe::CookingTime).integer().not_null())
                    .col(
                        ColumnDef::new(Recipe::PubDate)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(ColumnDef::new(Recipe::ShortLink).string_len(8).not_null())
                    .check(Expr::col(Recipe::CookingTime).gt(0))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_recipe_author")
                            .from(Recipe::Table, Recipe::AuthorId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Unique index: short_link
        manager
            .create_index(
                Index::create()
                    .name("idx_recipe_short_link")
                    .table(Recipe::Table)
                    .col(Recipe::ShortLink)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // Index: author_id (for author filter and recipe counts)
        manager
            .create_index(
                Index::create()
                    .name("idx_recipe_author_id")
                    .table(Recipe::Table)
                    .col(Recipe::AuthorId)
                    .to_owned(),
            )
            .await?;

        // Index: pub_date (default ordering)
        manager
            .create_index(
                Index::create()
                    .name("idx_recipe_pub_date")
                    .table(Recipe::Table)
                    .col(Recipe::PubDate)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Recipe::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Recipe {
    Table,
    Id,
    AuthorId,
    Name,
    Image,
    Text,
    CookingTime,
    PubDate,
    ShortLink,
}

#[derive(Iden)]
enum User {
    Table,
    Id,
}
