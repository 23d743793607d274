//! Completion service seam

use crate::error::CompletionError;
use crate::request::CompletionRequest;
use async_trait::async_trait;

/// Text-generation service
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CompletionClient: Send + Sync {
    /// Issue one chat-completion request
    ///
    /// Returns the first choice's text, trimmed, or `None` when the service
    /// produced no usable content.
    async fn complete(
        &self,
        request: &CompletionRequest,
    ) -> Result<Option<String>, CompletionError>;
}
