//! Common utilities and shared types for foodgram-rs.
//!
//! This crate provides foundational components used across all foodgram-rs crates:
//!
//! - **Configuration**: Application settings via [`Config`], including the
//!   numeric [`Limits`] handed to validators
//! - **Error handling**: Unified error types via [`AppError`] and [`AppResult`]
//! - **ID Generation**: Auth tokens and recipe short links via [`IdGenerator`]
//! - **Images**: Base64 data-URL image decoding and format checks via [`DataUrlImage`]
//! - **Pagination**: Page-number arithmetic via [`PageRequest`]
//! - **Storage**: File storage backends for recipe images and avatars
//!
//! # Example
//!
//! ```no_run
//! use foodgram_common::{Config, IdGenerator, AppResult};
//!
//! fn example() -> AppResult<()> {
//!     let config = Config::load()?;
//!     let id_gen = IdGenerator::new();
//!     let link = id_gen.generate_short_link();
//!     println!("{}/s/{}", config.server.url, link);
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod data_url;
pub mod error;
pub mod id;
pub mod pagination;
pub mod storage;

pub use config::{Config, Limits, PaginationConfig};
pub use data_url::DataUrlImage;
pub use error::{AppError, AppResult, FieldErrors, collect_field_errors};
pub use id::{IdGenerator, SHORT_LINK_LENGTH};
pub use pagination::PageRequest;
pub use storage::{LocalStorage, StorageBackend, StoredFile, generate_storage_key};
