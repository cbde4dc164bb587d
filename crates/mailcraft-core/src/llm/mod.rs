//! Completion service abstraction
//!
//! Defines the narrow seam between the pipeline and the remote text
//! completion oracle: one synchronous-from-the-caller request/response round
//! trip, no streaming, no partial results. Retry policy deliberately does not
//! live here. It belongs to the stages that need it, since retry strategy
//! differs by stage.

use crate::core_types::Message;
use crate::errors::PipelineError;
use async_trait::async_trait;

pub mod openai;

pub use openai::OpenAiClient;

/// A single-shot completion call against the remote service.
///
/// Implementations fail with [`PipelineError::UpstreamError`] on network,
/// auth, or quota failure and must not swallow it; the calling stage decides
/// whether to retry or abort.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    async fn complete(&self, messages: Vec<Message>) -> Result<String, PipelineError>;
}
