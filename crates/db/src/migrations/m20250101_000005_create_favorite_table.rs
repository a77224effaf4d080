//! Create favorite table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Favorite::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Favorite::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Favorite::UserId).integer().not_null())
                    .col(ColumnDef::new(Favorite::RecipeId).integer().not_null())
                    .col(
                        ColumnDef::new(Favorite::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_favorite_user")
                            .from(Favorite::Table, Favorite::UserId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_favorite_recipe")
                            .from(Favorite::Table, Favorite::RecipeId)
                            .to(Recipe::Table, Recipe::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Unique index: (user_id, recipe_id) - prevent duplicates
        manager
            .create_index(
                Index::create()
                    .name("idx_favorite_user_recipe")
                    .table(Favorite::Table)
                    .col(Favorite::UserId)
                    .col(Favorite::RecipeId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // Index: recipe_id
        manager
            .create_index(
                Index::create()
                    .name("idx_favorite_recipe_id")
                    .table(Favorite::Table)
                    .col(Favorite::RecipeId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Favorite::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Favorite {
    Table,
    Id,
    UserId,
    RecipeId,
    CreatedAt,
}

#[derive(Iden)]
enum User {
    Table,
    Id,
}

#[derive(Iden)]
enum Recipe {
    Table,
    Id,
}
