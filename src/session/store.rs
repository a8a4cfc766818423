//! Conversation session storage.
//!
//! [`SessionStore`] is the seam between the HTTP layer and whatever holds
//! conversation state. The only implementation is [`InMemorySessionStore`],
//! an `Arc`-cloneable map that lives as long as the process.
//!
//! # Example
//!
//! ```rust
//! # tokio_test::block_on(async {
//! use solaris::providers::Provider;
//! use solaris::session::{ConversationContext, Domain, InMemorySessionStore, Message, SessionStore};
//!
//! let store = InMemorySessionStore::new();
//! let session = store.create(ConversationContext::new(Domain::Aws), Provider::OpenAi).await;
//! store.append_message(&session.id, Message::user("hello")).await.unwrap();
//! let history = store.get_history(&session.id).await.unwrap();
//! assert_eq!(history.len(), 1);
//! # });
//! ```

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use tracing::debug;

use crate::error::{Result, SolarisError};
use crate::providers::Provider;

use super::types::{ConversationContext, ConversationSession, Message};

/// Storage for conversation sessions.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Create and store a new empty session.
    async fn create(&self, context: ConversationContext, provider: Provider)
        -> ConversationSession;

    /// Append a message to an existing session and return the updated session.
    async fn append_message(&self, id: &str, message: Message) -> Result<ConversationSession>;

    /// Return the ordered message history of a session.
    async fn get_history(&self, id: &str) -> Result<Vec<Message>>;

    /// Look up a session by id.
    async fn get(&self, id: &str) -> Option<ConversationSession>;
}

/// Process-local session store. Clones share the same map.
#[derive(Debug, Clone, Default)]
pub struct InMemorySessionStore {
    sessions: Arc<RwLock<HashMap<String, ConversationSession>>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of sessions currently held.
    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn create(
        &self,
        context: ConversationContext,
        provider: Provider,
    ) -> ConversationSession {
        let session = ConversationSession::new(context, provider);
        self.sessions
            .write()
            .await
            .insert(session.id.clone(), session.clone());
        debug!(session_id = %session.id, "Created conversation session");
        session
    }

    async fn append_message(&self, id: &str, message: Message) -> Result<ConversationSession> {
        let mut sessions = self.sessions.write().await;
        let session = sessions
            .get_mut(id)
            .ok_or_else(|| SolarisError::SessionNotFound(id.to_string()))?;
        session.messages.push(message);
        session.updated_at = Utc::now();
        Ok(session.clone())
    }

    async fn get_history(&self, id: &str) -> Result<Vec<Message>> {
        self.sessions
            .read()
            .await
            .get(id)
            .map(|s| s.messages.clone())
            .ok_or_else(|| SolarisError::SessionNotFound(id.to_string()))
    }

    async fn get(&self, id: &str) -> Option<ConversationSession> {
        self.sessions.read().await.get(id).cloned()
    }
}
