use std::sync::atomic::{AtomicUsize, Ordering};

use tracing::trace;

use super::QuestionGenerator;
use crate::scheduler::RequestItem;

/// Round-robin over a non-empty set of providers.
///
/// The cursor is explicit state owned by the rotation, seeded by the
/// caller, so two rotations never share a position.
#[derive(Debug)]
pub struct ProviderRotation<P> {
    providers: Vec<P>,
    cursor: AtomicUsize,
}

impl<P> ProviderRotation<P> {
    /// Start at the first provider. `None` if `providers` is empty.
    pub fn new(providers: Vec<P>) -> Option<Self> {
        Self::with_start(providers, 0)
    }

    /// Start at `start`, wrapped into range.
    pub fn with_start(providers: Vec<P>, start: usize) -> Option<Self> {
        if providers.is_empty() {
            return None;
        }
        let start = start % providers.len();
        Some(Self {
            providers,
            cursor: AtomicUsize::new(start),
        })
    }

    /// Return the current provider and advance the cursor.
    pub fn next_provider(&self) -> &P {
        let len = self.providers.len();
        let index = self
            .cursor
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |i| Some((i + 1) % len))
            .unwrap_or_else(|i| i);
        &self.providers[index % len]
    }

    /// Index the next call to [`next_provider`](Self::next_provider) uses.
    pub fn current_index(&self) -> usize {
        self.cursor.load(Ordering::Acquire)
    }

    pub fn providers(&self) -> &[P] {
        &self.providers
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    /// Always false; kept for API symmetry with collections.
    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}

#[async_trait::async_trait]
impl<P: QuestionGenerator> QuestionGenerator for ProviderRotation<P> {
    type Output = P::Output;
    type Error = P::Error;

    fn name(&self) -> &str {
        "rotation"
    }

    async fn generate(&self, request: &RequestItem) -> Result<Self::Output, Self::Error> {
        let provider = self.next_provider();
        trace!(provider = provider.name(), request_id = %request.id, "rotating provider");
        provider.generate(request).await
    }
}
