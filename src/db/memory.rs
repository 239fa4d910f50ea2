use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use tokio::sync::RwLock;

use crate::db::BlogStore;
use crate::db::contact_csv::ContactCsv;
use crate::db::models::{BlogPost, NewContact, NewPost, NewUser, User};
use crate::error::BlogError;

/// Process-local store. Everything except the contact log is lost on restart.
pub struct MemoryStore {
    posts: RwLock<Vec<BlogPost>>,
    users: RwLock<HashMap<String, User>>,
    contacts: ContactCsv,
}

impl MemoryStore {
    pub fn new(contacts: ContactCsv) -> Self {
        Self {
            posts: RwLock::new(Vec::new()),
            users: RwLock::new(HashMap::new()),
            contacts,
        }
    }
}

#[async_trait]
impl BlogStore for MemoryStore {
    async fn find_user(&self, username: &str) -> Result<Option<User>, BlogError> {
        Ok(self.users.read().await.get(username).cloned())
    }

    async fn create_user(&self, user: NewUser) -> Result<i64, BlogError> {
        let mut users = self.users.write().await;
        if users.contains_key(&user.username) {
            return Err(BlogError::UsernameTaken(user.username));
        }
        let id = users.len() as i64 + 1;
        users.insert(
            user.username.clone(),
            User {
                id,
                username: user.username,
                password_hash: user.password_hash,
                email: user.email,
                created_at: Utc::now().naive_utc(),
            },
        );
        Ok(id)
    }

    async fn list_posts(&self) -> Result<Vec<BlogPost>, BlogError> {
        // ids grow with insertion order, so reversing yields newest first
        Ok(self.posts.read().await.iter().rev().cloned().collect())
    }

    async fn get_post(&self, id: i64) -> Result<Option<BlogPost>, BlogError> {
        Ok(self.posts.read().await.iter().find(|p| p.id == id).cloned())
    }

    async fn insert_post(&self, post: NewPost) -> Result<i64, BlogError> {
        let mut posts = self.posts.write().await;
        let id = posts.last().map_or(1, |p| p.id + 1);
        posts.push(BlogPost {
            id,
            title: post.title,
            content: post.content,
            author: post.author,
            created_at: Utc::now().naive_utc(),
        });
        Ok(id)
    }

    async fn insert_contact(&self, contact: NewContact) -> Result<(), BlogError> {
        self.contacts.append(&contact).await
    }

    async fn count_posts(&self) -> Result<i64, BlogError> {
        Ok(self.posts.read().await.len() as i64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> (tempfile::TempDir, MemoryStore) {
        let dir = tempfile::tempdir().unwrap();
        let csv = ContactCsv::new(dir.path().join("contact.csv"));
        (dir, MemoryStore::new(csv))
    }

    #[tokio::test]
    async fn posts_round_trip_newest_first() {
        let (_dir, store) = store();
        let first = store
            .insert_post(NewPost {
                title: "one".into(),
                content: "0123456789".into(),
                author: "A".into(),
            })
            .await
            .unwrap();
        let second = store
            .insert_post(NewPost {
                title: "two".into(),
                content: "0123456789".into(),
                author: "B".into(),
            })
            .await
            .unwrap();

        assert_eq!((first, second), (1, 2));
        let listed = store.list_posts().await.unwrap();
        assert_eq!(listed[0].title, "two");
        assert_eq!(store.get_post(1).await.unwrap().unwrap().author, "A");
        assert!(store.get_post(3).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn usernames_are_unique() {
        let (_dir, store) = store();
        let user = NewUser {
            username: "admin".into(),
            password_hash: "h".into(),
            email: None,
        };
        store.create_user(user.clone()).await.unwrap();
        assert!(matches!(
            store.create_user(user).await,
            Err(BlogError::UsernameTaken(_))
        ));
    }
}
