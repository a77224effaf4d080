//! User entity.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "user")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    /// Login identifier
    #[sea_orm(unique)]
    pub email: String,

    #[sea_orm(unique)]
    pub username: String,

    pub first_name: String,

    pub last_name: String,

    /// Storage key of the avatar image
    #[sea_orm(nullable)]
    pub avatar: Option<String>,

    /// Argon2 PHC string
    #[serde(skip_serializing)]
    pub password: String,

    /// Access token
    #[sea_orm(unique, nullable)]
    #[serde(skip_serializing)]
    pub auth_token: Option<String>,

    #[sea_orm(default_value = false)]
    pub is_staff: bool,

    #[sea_orm(default_value = false)]
    pub is_superuser: bool,

    pub date_joined: DateTimeWithTimeZone,
}

impl Model {
    /// Staff and superusers may edit anyone's recipes.
    #[must_use]
    pub const fn is_privileged(&self) -> bool {
        self.is_staff || self.is_superuser
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::recipe::Entity")]
    Recipes,

    #[sea_orm(has_many = "super::favorite::Entity")]
    Favorites,

    #[sea_orm(has_many = "super::shopping_cart::Entity")]
    ShoppingCart,
}

impl Related<super::recipe::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Recipes.def()
    }
}

impl Related<super::favorite::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Favorites.def()
    }
}

impl Related<super::shopping_cart::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ShoppingCart.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
