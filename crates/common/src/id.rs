//! Token and short-link generation.

use uuid::Uuid;

/// Length of a recipe short link.
pub const SHORT_LINK_LENGTH: usize = 8;

/// Generator for opaque identifiers handed out to clients.
#[derive(Debug, Clone, Default)]
pub struct IdGenerator {
    _private: (),
}

impl IdGenerator {
    /// Create a new ID generator.
    #[must_use]
    pub const fn new() -> Self {
        Self { _private: () }
    }

    /// Generate a recipe short link: the first eight hex characters of a
    /// random UUID. Collisions are not retried here; the unique index on
    /// `recipe.short_link` rejects them.
    #[must_use]
    pub fn generate_short_link(&self) -> String {
        let mut link = Uuid::new_v4().simple().to_string();
        link.truncate(SHORT_LINK_LENGTH);
        link
    }

    /// Generate an authentication token (40 hex characters).
    #[must_use]
    pub fn generate_token(&self) -> String {
        // Use UUID v4 for tokens (no time component)
        let mut token = Uuid::new_v4().simple().to_string();
        token.push_str(&Uuid::new_v4().simple().to_string()[..8]);
        token
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_short_link() {
        let id_gen = IdGenerator::new();
        let link = id_gen.generate_short_link();

        assert_eq!(link.len(), SHORT_LINK_LENGTH);
        assert!(link.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(link, id_gen.generate_short_link());
    }

    #[test]
    fn test_generate_token() {
        let id_gen = IdGenerator::new();
        let token = id_gen.generate_token();

        assert_eq!(token.len(), 40);
        assert_ne!(token, id_gen.generate_token());
    }
}
