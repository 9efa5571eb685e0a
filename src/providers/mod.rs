//! Inference provider abstraction and implementations.
//!
//! Providers implement [`CompletionProvider`], a minimal trait that hides
//! transport, serialization, and vendor-specific API details. The analyzer
//! wraps whichever provider it is given with retry logic; providers
//! themselves only classify their failures into [`HuginnError`](crate::HuginnError)
//! and never retry.

pub mod openai;

pub use openai::{OpenAiConfig, OpenAiProvider};

use async_trait::async_trait;

use crate::Result;

/// A text-completion endpoint.
///
/// Implementations send a system instruction and a user prompt and return
/// the assistant's completion text. Errors must already be classified into
/// the crate's error taxonomy.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Provider name for logging/debugging.
    fn name(&self) -> &str;

    /// Send `system` context followed by a `user` prompt, returning the
    /// completion text.
    async fn complete(&self, system: &str, user: &str) -> Result<String>;
}
