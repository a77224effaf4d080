//! Ownership authorization for recipes.

use foodgram_common::{AppError, AppResult};
use foodgram_db::entities::{recipe, user};

/// Kind of access a request asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    /// Safe methods (GET, HEAD, OPTIONS).
    Read,
    /// Anything that mutates state.
    Write,
}

/// Read is open to everyone. Writes need a caller; writes to an existing
/// recipe need its author or a staff/superuser caller.
#[derive(Debug, Clone, Copy, Default)]
pub struct OwnershipPolicy;

impl OwnershipPolicy {
    /// Request-level check, before any recipe is loaded.
    pub fn check(caller: Option<&user::Model>, access: Access) -> AppResult<()> {
        match (access, caller) {
            (Access::Read, _) | (Access::Write, Some(_)) => Ok(()),
            (Access::Write, None) => Err(AppError::Unauthorized),
        }
    }

    /// Object-level check against a loaded recipe.
    pub fn check_object(
        caller: Option<&user::Model>,
        access: Access,
        recipe: &recipe::Model,
    ) -> AppResult<()> {
        Self::check(caller, access)?;
        match (access, caller) {
            (Access::Write, Some(caller))
                if caller.id != recipe.author_id && !caller.is_privileged() =>
            {
                Err(AppError::Forbidden(
                    "Only the author can change this recipe".to_string(),
                ))
            }
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn user(id: i32, is_staff: bool, is_superuser: bool) -> user::Model {
        user::Model {
            id,
            email: format!("u{id}@example.com"),
            username: format!("u{id}"),
            first_name: String::new(),
            last_name: String::new(),
            avatar: None,
            password: String::new(),
            auth_token: None,
            is_staff,
            is_superuser,
            date_joined: Utc::now().into(),
        }
    }

    fn recipe(author_id: i32) -> recipe::Model {
        recipe::Model {
            id: 1,
            author_id,
            name: "Суп".to_string(),
            image: "recipes/s.png".to_string(),
            text: "Варить".to_string(),
            cooking_time: 40,
            pub_date: Utc::now().into(),
            short_link: "00000000".to_string(),
        }
    }

    #[test]
    fn test_reads_always_allowed() {
        assert!(OwnershipPolicy::check(None, Access::Read).is_ok());
        assert!(OwnershipPolicy::check_object(None, Access::Read, &recipe(1)).is_ok());
    }

    #[test]
    fn test_anonymous_write_is_unauthorized() {
        assert!(matches!(
            OwnershipPolicy::check(None, Access::Write),
            Err(AppError::Unauthorized)
        ));
    }

    #[test]
    fn test_author_may_write() {
        let author = user(1, false, false);
        assert!(OwnershipPolicy::check_object(Some(&author), Access::Write, &recipe(1)).is_ok());
    }

    #[test]
    fn test_stranger_is_forbidden() {
        let stranger = user(2, false, false);
        assert!(matches!(
            OwnershipPolicy::check_object(Some(&stranger), Access::Write, &recipe(1)),
            Err(AppError::Forbidden(_))
        ));
    }

    #[test]
    fn test_staff_and_superuser_may_write() {
        let staff = user(3, true, false);
        let admin = user(4, false, true);
        assert!(OwnershipPolicy::check_object(Some(&staff), Access::Write, &recipe(1)).is_ok());
        assert!(OwnershipPolicy::check_object(Some(&admin), Access::Write, &recipe(1)).is_ok());
    }
}
