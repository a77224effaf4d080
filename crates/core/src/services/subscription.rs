//! Subscription service.

use foodgram_common::{AppError, AppResult, PageRequest};
use foodgram_db::{
    entities::{recipe, user},
    repositories::{RecipeRepository, SubscriptionRepository, UserRepository},
};

use crate::services::user::{UserProfile, UserService};

/// A followed author with a preview of their recipes.
#[derive(Debug, Clone)]
pub struct AuthorWithRecipes {
    pub profile: UserProfile,
    /// Newest first, truncated to the requested limit.
    pub recipes: Vec<recipe::Model>,
    /// Total number of recipes by the author.
    pub recipes_count: u64,
}

/// Parse the `recipes_limit` query parameter.
pub fn parse_recipes_limit(raw: Option<&str>) -> AppResult<Option<u64>> {
    match raw.map(str::trim).filter(|r| !r.is_empty()) {
        None => Ok(None),
        Some(raw) => raw.parse::<u64>().map(Some).map_err(|_| {
            AppError::field("recipes_limit", "Лимит рецептов должен быть целым числом.")
        }),
    }
}

/// Subscription service for business logic.
#[derive(Clone)]
pub struct SubscriptionService {
    subscription_repo: SubscriptionRepository,
    user_repo: UserRepository,
    recipe_repo: RecipeRepository,
    users: UserService,
}

impl SubscriptionService {
    /// Create a new subscription service.
    #[must_use]
    pub const fn new(
        subscription_repo: SubscriptionRepository,
        user_repo: UserRepository,
        recipe_repo: RecipeRepository,
        users: UserService,
    ) -> Self {
        Self {
            subscription_repo,
            user_repo,
            recipe_repo,
            users,
        }
    }

    /// Follow `author_id`.
    pub async fn subscribe(
        &self,
        follower: &user::Model,
        author_id: i32,
        recipes_limit: Option<u64>,
    ) -> AppResult<AuthorWithRecipes> {
        let author = self.user_repo.get_by_id(author_id).await?;

        if follower.id == author.id {
            return Err(AppError::Validation(
                "Нельзя подписаться на самого себя".to_string(),
            ));
        }
        if self.subscription_repo.exists(follower.id, author.id).await? {
            return Err(AppError::Validation(
                "Вы уже подписаны на этого автора".to_string(),
            ));
        }

        self.subscription_repo.create(follower.id, author.id).await?;
        tracing::debug!(follower_id = follower.id, author_id = author.id, "Subscribed");

        let profile = UserProfile {
            user: author,
            is_subscribed: true,
        };
        self.with_recipes(profile, recipes_limit).await
    }

    /// Stop following `author_id`.
    pub async fn unsubscribe(&self, follower: &user::Model, author_id: i32) -> AppResult<()> {
        let author = self.user_repo.get_by_id(author_id).await?;

        if !self.subscription_repo.delete(follower.id, author.id).await? {
            return Err(AppError::BadRequest(
                "Вы не подписаны на этого автора".to_string(),
            ));
        }
        Ok(())
    }

    /// Authors the user follows, with recipe previews.
    pub async fn list(
        &self,
        follower: &user::Model,
        page: PageRequest,
        recipes_limit: Option<u64>,
    ) -> AppResult<(Vec<AuthorWithRecipes>, u64)> {
        let (authors, count) = self.subscription_repo.find_authors(follower.id, page).await?;

        let profiles = self.users.profiles(Some(follower), authors).await?;
        let mut items = Vec::with_capacity(profiles.len());
        for profile in profiles {
            items.push(self.with_recipes(profile, recipes_limit).await?);
        }
        Ok((items, count))
    }

    async fn with_recipes(
        &self,
        profile: UserProfile,
        recipes_limit: Option<u64>,
    ) -> AppResult<AuthorWithRecipes> {
        let recipes = self
            .recipe_repo
            .find_by_author(profile.user.id, recipes_limit)
            .await?;
        let recipes_count = self.recipe_repo.count_by_author(profile.user.id).await?;

        Ok(AuthorWithRecipes {
            profile,
            recipes,
            recipes_count,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::services::test_support::{MemoryStorage, create_test_recipe, create_test_user};
    use foodgram_db::entities::subscription;
    use maplit::btreemap;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult, Value};
    use std::sync::Arc;

    fn service(
        subscription_db: MockDatabase,
        user_db: MockDatabase,
        recipe_db: MockDatabase,
    ) -> SubscriptionService {
        let subscription_conn = Arc::new(subscription_db.into_connection());
        let user_conn = Arc::new(user_db.into_connection());
        let users = UserService::new(
            UserRepository::new(Arc::clone(&user_conn)),
            SubscriptionRepository::new(Arc::clone(&subscription_conn)),
            Arc::new(MemoryStorage::default()),
            foodgram_common::Limits::default(),
        );
        SubscriptionService::new(
            SubscriptionRepository::new(subscription_conn),
            UserRepository::new(user_conn),
            RecipeRepository::new(Arc::new(recipe_db.into_connection())),
            users,
        )
    }

    #[test]
    fn test_parse_recipes_limit() {
        assert_eq!(parse_recipes_limit(None).unwrap(), None);
        assert_eq!(parse_recipes_limit(Some("3")).unwrap(), Some(3));
        assert!(matches!(
            parse_recipes_limit(Some("three")),
            Err(AppError::FieldValidation(_))
        ));
    }

    #[tokio::test]
    async fn test_self_subscription_rejected() {
        let me = create_test_user(1, "me_user");
        let user_db =
            MockDatabase::new(DatabaseBackend::Postgres).append_query_results([[me.clone()]]);

        let result = service(
            MockDatabase::new(DatabaseBackend::Postgres),
            user_db,
            MockDatabase::new(DatabaseBackend::Postgres),
        )
        .subscribe(&me, 1, None)
        .await;

        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_subscribe_returns_author_with_recipes() {
        let me = create_test_user(1, "reader");
        let author = create_test_user(2, "chef");

        let subscription_db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<subscription::Model>::new()])
            .append_query_results([[subscription::Model {
                id: 1,
                user_id: 1,
                author_id: 2,
                created_at: chrono::Utc::now().into(),
            }]]);
        let user_db =
            MockDatabase::new(DatabaseBackend::Postgres).append_query_results([[author]]);
        let recipe_db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[create_test_recipe(5, 2)]])
            .append_query_results([[btreemap! { "num_items" => Value::BigInt(Some(4)) }]]);

        let result = service(subscription_db, user_db, recipe_db)
            .subscribe(&me, 2, Some(1))
            .await
            .unwrap();

        assert!(result.profile.is_subscribed);
        assert_eq!(result.recipes.len(), 1);
        assert_eq!(result.recipes_count, 4);
    }

    #[tokio::test]
    async fn test_unsubscribe_absent_is_bad_request() {
        let me = create_test_user(1, "reader");
        let user_db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[create_test_user(2, "chef")]]);
        let subscription_db = MockDatabase::new(DatabaseBackend::Postgres).append_exec_results([
            MockExecResult {
                last_insert_id: 0,
                rows_affected: 0,
            },
        ]);

        let result = service(
            subscription_db,
            user_db,
            MockDatabase::new(DatabaseBackend::Postgres),
        )
        .unsubscribe(&me, 2)
        .await;

        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }

    #[tokio::test]
    async fn test_unsubscribe_unknown_author_is_not_found() {
        let me = create_test_user(1, "reader");
        let user_db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<user::Model>::new()]);

        let result = service(
            MockDatabase::new(DatabaseBackend::Postgres),
            user_db,
            MockDatabase::new(DatabaseBackend::Postgres),
        )
        .unsubscribe(&me, 2)
        .await;

        assert!(matches!(result, Err(AppError::UserNotFound(_))));
    }
}
