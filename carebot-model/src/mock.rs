//! Scripted completion model for tests and offline demos.

use std::collections::VecDeque;

use async_trait::async_trait;
use carebot_core::{CompletionModel, CompletionRequest, ModelError, Result};
use tokio::sync::Mutex;

type Responder = Box<dyn Fn(&CompletionRequest) -> Result<String> + Send + Sync>;

/// A [`CompletionModel`] that replays queued replies and records every request.
///
/// Queued replies are consumed first; once the queue is empty the fallback
/// responder (if any) answers, otherwise the call fails with
/// [`ModelError::EmptyResponse`].
pub struct MockCompletionModel {
    name: String,
    replies: Mutex<VecDeque<Result<String>>>,
    fallback: Option<Responder>,
    requests: Mutex<Vec<CompletionRequest>>,
}

impl MockCompletionModel {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            replies: Mutex::new(VecDeque::new()),
            fallback: None,
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Queue a successful reply.
    pub fn with_reply(self, reply: impl Into<String>) -> Self {
        self.with_result(Ok(reply.into()))
    }

    /// Queue a failing reply.
    pub fn with_error(self, error: ModelError) -> Self {
        self.with_result(Err(error))
    }

    fn with_result(mut self, result: Result<String>) -> Self {
        self.replies.get_mut().push_back(result);
        self
    }

    /// Answer every request not covered by the queue with `responder`.
    pub fn with_fallback(
        mut self,
        responder: impl Fn(&CompletionRequest) -> Result<String> + Send + Sync + 'static,
    ) -> Self {
        self.fallback = Some(Box::new(responder));
        self
    }

    /// Every request received so far, oldest first.
    pub async fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().await.clone()
    }

    pub async fn call_count(&self) -> usize {
        self.requests.lock().await.len()
    }
}

impl std::fmt::Debug for MockCompletionModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockCompletionModel")
            .field("name", &self.name)
            .field("has_fallback", &self.fallback.is_some())
            .finish()
    }
}

#[async_trait]
impl CompletionModel for MockCompletionModel {
    fn name(&self) -> &str {
        &self.name
    }

    async fn complete(&self, request: CompletionRequest) -> Result<String> {
        self.requests.lock().await.push(request.clone());

        if let Some(reply) = self.replies.lock().await.pop_front() {
            return reply;
        }
        match &self.fallback {
            Some(responder) => responder(&request),
            None => Err(ModelError::EmptyResponse { provider: self.name.clone() }),
        }
    }
}
