//! AI suggestion service adapter for Conciliar.
//!
//! Implements `conciliar_core::classification::AiSuggestionService` over
//! the Gemini `generateContent` API. HTTP failures are mapped to the typed
//! `AiError` kinds and retried with bounded exponential backoff when the
//! kind allows it.
//!
//! # Modules
//!
//! - `client` - HTTP client and status mapping
//! - `prompt` - Prompt construction
//! - `response` - Wire types and suggestion parsing
//! - `retry` - Bounded exponential backoff

pub mod client;
pub mod prompt;
pub mod response;
pub mod retry;

pub use client::GeminiClient;
pub use retry::RetryPolicy;
