//! Scripted provider for tests.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;

use super::{
    CompletionRequest, LlmProvider, LlmResponse, ResponseMetadata, ResponseTiming, TokenUsage,
};
use crate::types::{ErrorCategory, LlmError, Result};

#[derive(Debug, Clone)]
pub enum Scripted {
    Reply { text: String, usage: TokenUsage },
    Fail(ErrorCategory),
}

impl Scripted {
    pub fn reply(text: impl Into<String>, input: u64, output: u64) -> Self {
        Self::Reply {
            text: text.into(),
            usage: TokenUsage::new(input, output),
        }
    }
}

/// Answers calls from a queue; an empty queue fails with `Unavailable`
#[derive(Debug, Default)]
pub struct MockProvider {
    script: Mutex<VecDeque<Scripted>>,
    requests: Mutex<Vec<CompletionRequest>>,
}

impl MockProvider {
    pub fn new(script: impl IntoIterator<Item = Scripted>) -> Self {
        Self {
            script: Mutex::new(script.into_iter().collect()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl LlmProvider for MockProvider {
    async fn complete(&self, request: &CompletionRequest) -> Result<LlmResponse> {
        self.requests.lock().unwrap().push(request.clone());
        let next = self.script.lock().unwrap().pop_front();
        match next {
            Some(Scripted::Reply { text, usage }) => Ok(LlmResponse {
                content: text,
                usage,
                timing: ResponseTiming::default(),
                metadata: ResponseMetadata {
                    model: request.model.clone(),
                    provider: "mock".to_string(),
                },
            }),
            Some(Scripted::Fail(category)) => {
                Err(LlmError::with_provider(category, "scripted failure", "mock").into())
            }
            None => Err(LlmError::new(ErrorCategory::Unavailable, "script exhausted").into()),
        }
    }

    fn name(&self) -> &str {
        "mock"
    }
}
