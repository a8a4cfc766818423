//! Conversation messages, contexts and session storage.

pub mod store;
pub mod types;

pub use store::{InMemorySessionStore, SessionStore};
pub use types::{ConversationContext, ConversationSession, Domain, Message, Role};
