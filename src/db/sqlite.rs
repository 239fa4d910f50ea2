use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions, SqliteRow};
use sqlx::{Pool, Row, Sqlite};
use std::str::FromStr;
use tracing::debug;

use crate::db::BlogStore;
use crate::db::models::{BlogPost, NewContact, NewPost, NewUser, User};
use crate::db::schema::SQLITE_INIT;
use crate::error::BlogError;

pub type SqlitePool = Pool<Sqlite>;

#[derive(Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Connect to `database_url`, creating the file when it does not exist yet.
    pub async fn connect(database_url: &str) -> Result<Self, BlogError> {
        let connect_opts = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(connect_opts)
            .await?;
        debug!(database_url, "sqlite pool ready");
        Ok(Self::new(pool))
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Initialize the schema by executing the bundled DDL.
    pub async fn init_schema(&self) -> Result<(), BlogError> {
        // sqlx::query runs one statement at a time
        for stmt in SQLITE_INIT.split(';') {
            let s = stmt.trim();
            if s.is_empty() {
                continue;
            }
            sqlx::query(s).execute(&self.pool).await?;
        }
        Ok(())
    }

    fn row_to_post(row: SqliteRow) -> Result<BlogPost, BlogError> {
        Ok(BlogPost {
            id: row.try_get("id")?,
            title: row.try_get("title")?,
            content: row.try_get("content")?,
            author: row.try_get("author")?,
            created_at: row.try_get("created_at")?,
        })
    }
}

#[async_trait]
impl BlogStore for SqliteStore {
    async fn find_user(&self, username: &str) -> Result<Option<User>, BlogError> {
        let user = sqlx::query_as::<_, User>(
            r#"SELECT id, username, password_hash, email, created_at
               FROM users WHERE username = ?"#,
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn create_user(&self, user: NewUser) -> Result<i64, BlogError> {
        let result = sqlx::query("INSERT INTO users (username, password_hash, email) VALUES (?, ?, ?)")
            .bind(&user.username)
            .bind(&user.password_hash)
            .bind(&user.email)
            .execute(&self.pool)
            .await;

        match result {
            Ok(done) => Ok(done.last_insert_rowid()),
            Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
                Err(BlogError::UsernameTaken(user.username))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn list_posts(&self) -> Result<Vec<BlogPost>, BlogError> {
        let rows = sqlx::query(
            r#"SELECT id, title, content, author, created_at
               FROM blog_posts ORDER BY created_at DESC, id DESC"#,
        )
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(Self::row_to_post).collect()
    }

    async fn get_post(&self, id: i64) -> Result<Option<BlogPost>, BlogError> {
        let row = sqlx::query(
            r#"SELECT id, title, content, author, created_at
               FROM blog_posts WHERE id = ?"#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        row.map(Self::row_to_post).transpose()
    }

    async fn insert_post(&self, post: NewPost) -> Result<i64, BlogError> {
        let done = sqlx::query("INSERT INTO blog_posts (title, content, author) VALUES (?, ?, ?)")
            .bind(post.title)
            .bind(post.content)
            .bind(post.author)
            .execute(&self.pool)
            .await?;
        Ok(done.last_insert_rowid())
    }

    async fn insert_contact(&self, contact: NewContact) -> Result<(), BlogError> {
        sqlx::query(
            "INSERT INTO contact_messages (name, email, subject, message) VALUES (?, ?, ?, ?)",
        )
        .bind(contact.name)
        .bind(contact.email)
        .bind(contact.subject)
        .bind(contact.message)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn count_posts(&self) -> Result<i64, BlogError> {
        let rec: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM blog_posts")
            .fetch_one(&self.pool)
            .await?;
        Ok(rec.0)
    }
}
