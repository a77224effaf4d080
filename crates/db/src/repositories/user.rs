//! User repository.

use std::sync::Arc;

use crate::entities::{User, user};
use crate::map_write_err;
use foodgram_common::{AppError, AppResult, PageRequest};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set,
};

/// User repository for database operations.
#[derive(Clone)]
pub struct UserRepository {
    db: Arc<DatabaseConnection>,
}

impl UserRepository {
    /// Create a new user repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a user by ID.
    pub async fn find_by_id(&self, id: i32) -> AppResult<Option<user::Model>> {
        User::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a user by ID, returning an error if not found.
    pub async fn get_by_id(&self, id: i32) -> AppResult<user::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::UserNotFound(id.to_string()))
    }

    /// Find users by IDs.
    pub async fn find_by_ids(&self, ids: &[i32]) -> AppResult<Vec<user::Model>> {
        if ids.is_empty() {
            return Ok(vec![]);
        }

        User::find()
            .filter(user::Column::Id.is_in(ids.iter().copied()))
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a user by email (case-insensitive).
    pub async fn find_by_email(&self, email: &str) -> AppResult<Option<user::Model>> {
        User::find()
            .filter(user::Column::Email.eq(email.to_lowercase()))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a user by username.
    pub async fn find_by_username(&self, username: &str) -> AppResult<Option<user::Model>> {
        User::find()
            .filter(user::Column::Username.eq(username))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a user by auth token.
    pub async fn find_by_token(&self, token: &str) -> AppResult<Option<user::Model>> {
        User::find()
            .filter(user::Column::AuthToken.eq(token))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create a new user.
    pub async fn create(&self, model: user::ActiveModel) -> AppResult<user::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| map_write_err(e, "User"))
    }

    /// Update a user.
    pub async fn update(&self, model: user::ActiveModel) -> AppResult<user::Model> {
        model
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Set or clear the auth token.
    pub async fn set_token(&self, id: i32, token: Option<String>) -> AppResult<user::Model> {
        let model = user::ActiveModel {
            id: Set(id),
            auth_token: Set(token),
            ..Default::default()
        };
        self.update(model).await
    }

    /// Set or clear the avatar storage key.
    pub async fn set_avatar(&self, id: i32, avatar: Option<String>) -> AppResult<user::Model> {
        let model = user::ActiveModel {
            id: Set(id),
            avatar: Set(avatar),
            ..Default::default()
        };
        self.update(model).await
    }

    /// Replace the password hash.
    pub async fn set_password(&self, id: i32, password_hash: String) -> AppResult<user::Model> {
        let model = user::ActiveModel {
            id: Set(id),
            password: Set(password_hash),
            ..Default::default()
        };
        self.update(model).await
    }

    /// List users ordered by username, one page at a time.
    pub async fn list(&self, page: PageRequest) -> AppResult<(Vec<user::Model>, u64)> {
        let count = User::find()
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        page.ensure_in_range(count)?;

        let users = User::find()
            .order_by_asc(user::Column::Username)
            .offset(page.offset())
            .limit(page.page_size)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok((users, count))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use maplit::btreemap;
    use sea_orm::{DatabaseBackend, MockDatabase, Value};
    use std::sync::Arc;

    fn create_test_user(id: i32, username: &str) -> user::Model {
        user::Model {
            id,
            email: format!("{username}@example.com"),
            username: username.to_string(),
            first_name: "Test".to_string(),
            last_name: "User".to_string(),
            avatar: None,
            password: "$argon2id$stub".to_string(),
            auth_token: Some("test_token".to_string()),
            is_staff: false,
            is_superuser: false,
            date_joined: Utc::now().into(),
        }
    }

    #[tokio::test]
    async fn test_find_by_id_found() {
        let user = create_test_user(1, "testuser");

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[user.clone()]])
                .into_connection(),
        );

        let repo = UserRepository::new(db);
        let result = repo.find_by_id(1).await.unwrap();

        assert!(result.is_some());
        let found_user = result.unwrap();
        assert_eq!(found_user.id, 1);
        assert_eq!(found_user.username, "testuser");
    }

    #[tokio::test]
    async fn test_get_by_id_not_found_returns_error() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<user::Model>::new()])
                .into_connection(),
        );

        let repo = UserRepository::new(db);
        let result = repo.get_by_id(42).await;

        match result {
            Err(AppError::UserNotFound(id)) => assert_eq!(id, "42"),
            _ => panic!("Expected UserNotFound error"),
        }
    }

    #[tokio::test]
    async fn test_find_by_token() {
        let user = create_test_user(1, "testuser");

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[user.clone()]])
                .into_connection(),
        );

        let repo = UserRepository::new(db);
        let result = repo.find_by_token("test_token").await.unwrap();

        assert_eq!(result.unwrap().auth_token, Some("test_token".to_string()));
    }

    #[tokio::test]
    async fn test_create_user() {
        let user = create_test_user(1, "newuser");

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[user.clone()]])
                .into_connection(),
        );

        let repo = UserRepository::new(db);

        let active = user::ActiveModel {
            email: Set("newuser@example.com".to_string()),
            username: Set("newuser".to_string()),
            ..Default::default()
        };

        let result = repo.create(active).await.unwrap();
        assert_eq!(result.username, "newuser");
    }

    #[tokio::test]
    async fn test_list_returns_page_and_count() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[btreemap! {
                    "num_items" => Value::BigInt(Some(7)),
                }]])
                .append_query_results([[create_test_user(1, "alice"), create_test_user(2, "bob")]])
                .into_connection(),
        );

        let repo = UserRepository::new(db);
        let page = PageRequest {
            page: 1,
            page_size: 2,
        };
        let (users, count) = repo.list(page).await.unwrap();

        assert_eq!(count, 7);
        assert_eq!(users.len(), 2);
        assert_eq!(users[0].username, "alice");
    }

    #[tokio::test]
    async fn test_list_rejects_page_past_end_without_fetching_rows() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[btreemap! {
                    "num_items" => Value::BigInt(Some(7)),
                }]])
                .into_connection(),
        );

        let repo = UserRepository::new(db);
        let page = PageRequest {
            page: u64::MAX,
            page_size: 6,
        };

        assert!(matches!(repo.list(page).await, Err(AppError::NotFound(_))));
    }
}
