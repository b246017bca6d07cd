//! Question generation backends.
//!
//! The runtime never talks to an LLM provider directly. Callers inject a
//! [`QuestionGenerator`], optionally wrapped in a [`ProviderRotation`] to
//! spread load across several backends.

mod rotation;

pub use rotation::ProviderRotation;

use crate::retry::ClassifyError;
use crate::scheduler::RequestItem;

/// Backend that turns a dequeued request into a finished result.
#[async_trait::async_trait]
pub trait QuestionGenerator: Send + Sync {
    type Output: Clone + Send;
    type Error: ClassifyError + std::error::Error + Send + 'static;

    /// Backend name for logs and spans.
    fn name(&self) -> &str {
        "generator"
    }

    async fn generate(&self, request: &RequestItem) -> Result<Self::Output, Self::Error>;
}
