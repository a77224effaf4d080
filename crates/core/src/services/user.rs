//! User service.

use std::collections::HashSet;
use std::sync::{Arc, LazyLock};

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use foodgram_common::{
    AppError, AppResult, DataUrlImage, IdGenerator, Limits, PageRequest, StorageBackend,
    generate_storage_key,
};
use foodgram_db::{
    entities::user,
    repositories::{SubscriptionRepository, UserRepository},
};
use regex::Regex;
use sea_orm::Set;
use serde::Deserialize;
use validator::{Validate, ValidationError};

use crate::validation::validate_with_lengths;

static USERNAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[\w.@+-]+$").expect("valid username pattern"));

/// A user as seen by a particular viewer.
#[derive(Debug, Clone)]
pub struct UserProfile {
    pub user: user::Model,
    /// Whether the viewer follows this user. Always `false` for anonymous
    /// viewers and for the viewer's own profile.
    pub is_subscribed: bool,
}

/// User service for business logic.
#[derive(Clone)]
pub struct UserService {
    user_repo: UserRepository,
    subscription_repo: SubscriptionRepository,
    storage: Arc<dyn StorageBackend>,
    limits: Limits,
    id_gen: IdGenerator,
}

/// Input for registering a new user.
///
/// Maximum lengths come from [`Limits`] and are checked by [`UserService::create`].
#[derive(Debug, Deserialize, Validate)]
pub struct CreateUserInput {
    #[validate(email(message = "Введите правильный адрес электронной почты."))]
    pub email: String,

    #[validate(
        length(min = 1),
        regex(path = *USERNAME_RE, message = "Допустимы только буквы, цифры и символы @/./+/-/_."),
        custom(function = "validate_not_me")
    )]
    pub username: String,

    #[validate(length(min = 1))]
    pub first_name: String,

    #[validate(length(min = 1))]
    pub last_name: String,

    #[validate(length(min = 8, max = 128))]
    pub password: String,
}

/// Input for changing the caller's password.
#[derive(Debug, Deserialize, Validate)]
pub struct SetPasswordInput {
    #[validate(length(min = 1))]
    pub current_password: String,

    #[validate(length(min = 8, max = 128))]
    pub new_password: String,
}

/// Input for obtaining an auth token.
#[derive(Debug, Deserialize, Validate)]
pub struct LoginInput {
    #[validate(length(min = 1))]
    pub email: String,

    #[validate(length(min = 1))]
    pub password: String,
}

fn validate_not_me(username: &str) -> Result<(), ValidationError> {
    if username.eq_ignore_ascii_case("me") {
        let mut err = ValidationError::new("reserved_username");
        err.message = Some("Имя пользователя «me» недоступно.".into());
        return Err(err);
    }
    Ok(())
}

impl UserService {
    /// Create a new user service.
    #[must_use]
    pub fn new(
        user_repo: UserRepository,
        subscription_repo: SubscriptionRepository,
        storage: Arc<dyn StorageBackend>,
        limits: Limits,
    ) -> Self {
        Self {
            user_repo,
            subscription_repo,
            storage,
            limits,
            id_gen: IdGenerator::new(),
        }
    }

    /// Register a new user.
    pub async fn create(&self, input: CreateUserInput) -> AppResult<user::Model> {
        validate_with_lengths(
            &input,
            &[
                ("email", input.email.as_str(), self.limits.max_email_length),
                ("username", input.username.as_str(), self.limits.max_username_length),
                ("first_name", input.first_name.as_str(), self.limits.max_first_name_length),
                ("last_name", input.last_name.as_str(), self.limits.max_last_name_length),
            ],
        )?;

        let email = input.email.trim().to_lowercase();

        if self.user_repo.find_by_email(&email).await?.is_some() {
            return Err(AppError::field(
                "email",
                "Пользователь с таким адресом электронной почты уже существует.",
            ));
        }
        if self
            .user_repo
            .find_by_username(&input.username)
            .await?
            .is_some()
        {
            return Err(AppError::field(
                "username",
                "Пользователь с таким именем уже существует.",
            ));
        }

        let password_hash = hash_password(&input.password)?;

        let model = user::ActiveModel {
            email: Set(email),
            username: Set(input.username),
            first_name: Set(input.first_name),
            last_name: Set(input.last_name),
            avatar: Set(None),
            password: Set(password_hash),
            auth_token: Set(None),
            is_staff: Set(false),
            is_superuser: Set(false),
            date_joined: Set(chrono::Utc::now().into()),
            ..Default::default()
        };

        let user = self.user_repo.create(model).await?;
        tracing::info!(user_id = user.id, username = %user.username, "User registered");
        Ok(user)
    }

    /// Get a user profile as seen by `viewer`.
    pub async fn get_profile(
        &self,
        viewer: Option<&user::Model>,
        id: i32,
    ) -> AppResult<UserProfile> {
        let user = self.user_repo.get_by_id(id).await?;
        let mut profiles = self.profiles(viewer, vec![user]).await?;
        profiles
            .pop()
            .ok_or_else(|| AppError::UserNotFound(id.to_string()))
    }

    /// List users ordered by username.
    pub async fn list(
        &self,
        viewer: Option<&user::Model>,
        page: PageRequest,
    ) -> AppResult<(Vec<UserProfile>, u64)> {
        let (users, count) = self.user_repo.list(page).await?;
        Ok((self.profiles(viewer, users).await?, count))
    }

    /// Attach the viewer's subscription flag to each user.
    pub async fn profiles(
        &self,
        viewer: Option<&user::Model>,
        users: Vec<user::Model>,
    ) -> AppResult<Vec<UserProfile>> {
        let followed = match viewer {
            Some(viewer) => {
                let ids: Vec<i32> = users.iter().map(|u| u.id).collect();
                self.subscription_repo
                    .subscribed_among(viewer.id, &ids)
                    .await?
            }
            None => HashSet::new(),
        };
        let viewer_id = viewer.map(|v| v.id);

        Ok(users
            .into_iter()
            .map(|user| UserProfile {
                is_subscribed: Some(user.id) != viewer_id && followed.contains(&user.id),
                user,
            })
            .collect())
    }

    /// Authenticate a user by token.
    pub async fn authenticate_by_token(&self, token: &str) -> AppResult<user::Model> {
        self.user_repo
            .find_by_token(token)
            .await?
            .ok_or(AppError::Unauthorized)
    }

    /// Check credentials and return the user's auth token, issuing one if needed.
    pub async fn login(&self, input: LoginInput) -> AppResult<String> {
        input.validate()?;

        let invalid =
            || AppError::Validation("Невозможно войти с предоставленными учетными данными.".to_string());

        let user = self
            .user_repo
            .find_by_email(input.email.trim())
            .await?
            .ok_or_else(invalid)?;

        if !verify_password(&input.password, &user.password)? {
            return Err(invalid());
        }

        if let Some(token) = user.auth_token {
            return Ok(token);
        }

        let token = self.id_gen.generate_token();
        self.user_repo.set_token(user.id, Some(token.clone())).await?;
        tracing::debug!(user_id = user.id, "Issued auth token");
        Ok(token)
    }

    /// Revoke the user's auth token.
    pub async fn logout(&self, user: &user::Model) -> AppResult<()> {
        self.user_repo.set_token(user.id, None).await?;
        Ok(())
    }

    /// Change the user's password after checking the current one.
    pub async fn set_password(&self, user: &user::Model, input: SetPasswordInput) -> AppResult<()> {
        input.validate()?;

        if !verify_password(&input.current_password, &user.password)? {
            return Err(AppError::field("current_password", "Неверный текущий пароль"));
        }

        let password_hash = hash_password(&input.new_password)?;
        self.user_repo.set_password(user.id, password_hash).await?;
        Ok(())
    }

    /// Replace the user's avatar with a base64 data-URL image.
    pub async fn set_avatar(
        &self,
        user: &user::Model,
        avatar: Option<&str>,
    ) -> AppResult<user::Model> {
        let raw = avatar
            .filter(|a| !a.is_empty())
            .ok_or_else(|| AppError::field("avatar", "Обязательное поле."))?;
        let image = DataUrlImage::parse("avatar", raw)?;

        let key = generate_storage_key("users", &image.extension);
        self.storage
            .upload(&key, &image.bytes, &image.content_type)
            .await?;

        let updated = match self.user_repo.set_avatar(user.id, Some(key.clone())).await {
            Ok(updated) => updated,
            Err(e) => {
                self.remove_file(&key).await;
                return Err(e);
            }
        };

        if let Some(old) = &user.avatar {
            self.remove_file(old).await;
        }

        Ok(updated)
    }

    /// Remove the user's avatar.
    pub async fn delete_avatar(&self, user: &user::Model) -> AppResult<()> {
        let Some(old) = &user.avatar else {
            return Ok(());
        };

        self.user_repo.set_avatar(user.id, None).await?;
        self.remove_file(old).await;
        Ok(())
    }

    async fn remove_file(&self, key: &str) {
        if let Err(e) = self.storage.delete(key).await {
            tracing::warn!(key = %key, error = %e, "Failed to delete stored file");
        }
    }
}

/// Hash a password using Argon2.
pub(crate) fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| AppError::Internal(format!("Failed to hash password: {e}")))
}

/// Verify a password against a hash.
fn verify_password(password: &str, hash: &str) -> AppResult<bool> {
    let parsed_hash =
        PasswordHash::new(hash).map_err(|e| AppError::Internal(format!("Invalid hash: {e}")))?;

    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}
