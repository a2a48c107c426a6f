//! Per-user conversation storage.
//!
//! Sessions live in process memory and are lost on restart; an admin who
//! was half-way through a form simply starts again.

use std::collections::HashMap;

use assorti_core::conversation::Conversation;
use async_trait::async_trait;
use tokio::sync::RwLock;

/// Keeps one [`Conversation`] per Telegram user id.
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn get(&self, user_id: i64) -> Option<Conversation>;

    async fn put(&self, user_id: i64, conversation: Conversation);

    async fn remove(&self, user_id: i64);
}

#[derive(Debug, Default)]
pub struct InMemorySessionStore {
    sessions: RwLock<HashMap<i64, Conversation>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn get(&self, user_id: i64) -> Option<Conversation> {
        self.sessions.read().await.get(&user_id).cloned()
    }

    async fn put(&self, user_id: i64, conversation: Conversation) {
        self.sessions.write().await.insert(user_id, conversation);
    }

    async fn remove(&self, user_id: i64) {
        self.sessions.write().await.remove(&user_id);
    }
}
