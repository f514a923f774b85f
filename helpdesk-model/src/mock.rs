//! Scripted completion model for tests.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::completion::{CompletionModel, CompletionRequest, ModelTurn};
use crate::error::{ModelError, Result};

/// A [`CompletionModel`] that replays a fixed script of turns and records
/// every request it receives.
///
/// Each call to [`complete`](CompletionModel::complete) pops the next
/// scripted result; an exhausted script yields
/// [`ModelError::MalformedResponse`].
///
/// # Example
///
/// ```rust
/// use helpdesk_model::{MockCompletionModel, ModelTurn};
///
/// let model = MockCompletionModel::new("mock").with_turn(ModelTurn::answer("hi"));
/// assert_eq!(model.call_count(), 0);
/// ```
#[derive(Debug, Default)]
pub struct MockCompletionModel {
    name: String,
    script: Mutex<VecDeque<Result<ModelTurn>>>,
    requests: Mutex<Vec<CompletionRequest>>,
}

impl MockCompletionModel {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), ..Default::default() }
    }

    /// Queue a successful turn.
    pub fn with_turn(self, turn: ModelTurn) -> Self {
        self.push(Ok(turn));
        self
    }

    /// Queue a failure.
    pub fn with_error(self, error: ModelError) -> Self {
        self.push(Err(error));
        self
    }

    fn push(&self, result: Result<ModelTurn>) {
        self.script.lock().unwrap_or_else(|e| e.into_inner()).push_back(result);
    }

    /// Requests received so far, in call order.
    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap_or_else(|e| e.into_inner()).len()
    }
}

#[async_trait]
impl CompletionModel for MockCompletionModel {
    fn name(&self) -> &str {
        &self.name
    }

    async fn complete(&self, request: CompletionRequest) -> Result<ModelTurn> {
        self.requests.lock().unwrap_or_else(|e| e.into_inner()).push(request);
        self.script.lock().unwrap_or_else(|e| e.into_inner()).pop_front().unwrap_or_else(|| {
            Err(ModelError::MalformedResponse {
                provider: "mock".into(),
                message: "mock script exhausted".into(),
            })
        })
    }
}
