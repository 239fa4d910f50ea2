//! Database module: models, schema and the pluggable stores.
//!
//! Layout:
//! - `models.rs`: Rust structs mirroring DB rows
//! - `schema.rs`: SQL DDL for initializing the database (SQLite-first)
//! - `sqlite.rs`: relational store backed by a sqlx pool
//! - `memory.rs`: process-local store, contact messages go to `contact_csv.rs`

pub mod contact_csv;
pub mod memory;
pub mod models;
pub mod schema;
pub mod sqlite;

use async_trait::async_trait;
use std::sync::Arc;

use crate::config::{Backend, Config};
use crate::error::BlogError;

pub use contact_csv::ContactCsv;
pub use memory::MemoryStore;
pub use models::{BlogPost, ContactMessage, NewContact, NewPost, NewUser, User};
pub use schema::SQLITE_INIT;
pub use sqlite::{SqlitePool, SqliteStore};

/// Persistence seam shared by every route.
#[async_trait]
pub trait BlogStore: Send + Sync {
    async fn find_user(&self, username: &str) -> Result<Option<User>, BlogError>;

    /// Insert a new account. Fails with `UsernameTaken` on a duplicate name.
    async fn create_user(&self, user: NewUser) -> Result<i64, BlogError>;

    /// All posts, newest first.
    async fn list_posts(&self) -> Result<Vec<BlogPost>, BlogError>;

    async fn get_post(&self, id: i64) -> Result<Option<BlogPost>, BlogError>;

    async fn insert_post(&self, post: NewPost) -> Result<i64, BlogError>;

    async fn insert_contact(&self, contact: NewContact) -> Result<(), BlogError>;

    async fn count_posts(&self) -> Result<i64, BlogError>;
}

/// Open the store selected by `cfg.backend`.
pub async fn open(cfg: &Config) -> Result<Arc<dyn BlogStore>, BlogError> {
    match cfg.backend {
        Backend::Sqlite => {
            let store = SqliteStore::connect(&cfg.database_url).await?;
            store.init_schema().await?;
            Ok(Arc::new(store))
        }
        Backend::Memory => Ok(Arc::new(MemoryStore::new(ContactCsv::new(
            cfg.contact_csv_path.clone(),
        )))),
    }
}
