//! Solaris - an AI gateway that routes chat requests to OpenAI or Gemini.
//!
//! ```text
//! HTTP (api) ──> RequestRouter ──> ResponseCache (redis | memory | none)
//!                     │
//!                     └──> ProviderRegistry ──> OpenAiProvider | GeminiProvider
//! ```
//!
//! Alongside chat, the gateway keeps in-memory conversation sessions and
//! produces rule-based conversation analysis.

pub mod analysis;
pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod prompt;
pub mod providers;
pub mod router;
pub mod session;

pub use config::Config;
pub use error::{Result, SolarisError};
pub use providers::{ChatProvider, ChatRequest, ChatResponse, Provider, ProviderRegistry};
pub use router::RequestRouter;
