//! Subscription repository.

use std::collections::HashSet;
use std::sync::Arc;

use crate::entities::{Subscription, User, subscription, user};
use crate::map_write_err;
use foodgram_common::{AppError, AppResult, PageRequest};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set, sea_query::Query,
};

/// Subscription repository for database operations.
#[derive(Clone)]
pub struct SubscriptionRepository {
    db: Arc<DatabaseConnection>,
}

impl SubscriptionRepository {
    /// Create a new subscription repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Check if `user_id` follows `author_id`.
    pub async fn exists(&self, user_id: i32, author_id: i32) -> AppResult<bool> {
        let found = Subscription::find()
            .filter(subscription::Column::UserId.eq(user_id))
            .filter(subscription::Column::AuthorId.eq(author_id))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(found.is_some())
    }

    /// Which of `author_ids` the user follows.
    pub async fn subscribed_among(
        &self,
        user_id: i32,
        author_ids: &[i32],
    ) -> AppResult<HashSet<i32>> {
        if author_ids.is_empty() {
            return Ok(HashSet::new());
        }

        let ids: Vec<i32> = Subscription::find()
            .select_only()
            .column(subscription::Column::AuthorId)
            .filter(subscription::Column::UserId.eq(user_id))
            .filter(subscription::Column::AuthorId.is_in(author_ids.iter().copied()))
            .into_tuple()
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(ids.into_iter().collect())
    }

    /// Create a subscription. A concurrent duplicate surfaces as a conflict.
    pub async fn create(&self, user_id: i32, author_id: i32) -> AppResult<subscription::Model> {
        let model = subscription::ActiveModel {
            user_id: Set(user_id),
            author_id: Set(author_id),
            created_at: Set(chrono::Utc::now().into()),
            ..Default::default()
        };
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| map_write_err(e, "Subscription"))
    }

    /// Delete a subscription. Returns `false` when there was nothing to delete.
    pub async fn delete(&self, user_id: i32, author_id: i32) -> AppResult<bool> {
        let result = Subscription::delete_many()
            .filter(subscription::Column::UserId.eq(user_id))
            .filter(subscription::Column::AuthorId.eq(author_id))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(result.rows_affected > 0)
    }

    /// Authors followed by `user_id`, ordered by username, one page at a time.
    pub async fn find_authors(
        &self,
        user_id: i32,
        page: PageRequest,
    ) -> AppResult<(Vec<user::Model>, u64)> {
        let followed = Query::select()
            .column(subscription::Column::AuthorId)
            .from(Subscription)
            .and_where(subscription::Column::UserId.eq(user_id))
            .to_owned();
        let query = User::find().filter(user::Column::Id.in_subquery(followed));

        let count = query
            .clone()
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        page.ensure_in_range(count)?;

        let authors = query
            .order_by_asc(user::Column::Username)
            .offset(page.offset())
            .limit(page.page_size)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok((authors, count))
    }
}
