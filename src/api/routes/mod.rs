//! Route handlers, one module per resource.

pub mod analyze;
pub mod chat;
pub mod conversation;
pub mod health;
pub mod providers;
