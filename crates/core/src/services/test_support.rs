//! Shared fixtures for service tests.

#![allow(clippy::unwrap_used)]

use std::sync::Mutex;

use chrono::Utc;
use foodgram_common::{AppResult, StorageBackend, StoredFile};
use foodgram_db::entities::{recipe, user};

/// In-memory storage backend that records uploaded keys.
#[derive(Default)]
pub struct MemoryStorage {
    keys: Mutex<Vec<String>>,
}

impl MemoryStorage {
    pub fn keys(&self) -> Vec<String> {
        self.keys.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl StorageBackend for MemoryStorage {
    async fn upload(&self, key: &str, data: &[u8], content_type: &str) -> AppResult<StoredFile> {
        self.keys.lock().unwrap().push(key.to_string());
        Ok(StoredFile {
            key: key.to_string(),
            url: self.public_url(key),
            size: data.len() as u64,
            content_type: content_type.to_string(),
        })
    }

    async fn delete(&self, key: &str) -> AppResult<()> {
        self.keys.lock().unwrap().retain(|k| k != key);
        Ok(())
    }

    fn public_url(&self, key: &str) -> String {
        format!("/media/{key}")
    }
}

pub fn create_test_user(id: i32, username: &str) -> user::Model {
    user::Model {
        id,
        email: format!("{username}@example.com"),
        username: username.to_string(),
        first_name: "Test".to_string(),
        last_name: "User".to_string(),
        avatar: None,
        password: String::new(),
        auth_token: None,
        is_staff: false,
        is_superuser: false,
        date_joined: Utc::now().into(),
    }
}

pub fn create_test_recipe(id: i32, author_id: i32) -> recipe::Model {
    recipe::Model {
        id,
        author_id,
        name: "Блины".to_string(),
        image: "recipes/bliny.png".to_string(),
        text: "Смешать и жарить".to_string(),
        cooking_time: 30,
        pub_date: Utc::now().into(),
        short_link: "abcd1234".to_string(),
    }
}
