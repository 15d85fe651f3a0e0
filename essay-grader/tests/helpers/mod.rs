//! Test doubles for the LLM capability
//!
//! `ScriptedLlm` replays a fixed sequence of replies and records every prompt
//! it receives; `SlowLlm` never answers within a short timeout.

#![allow(dead_code)]

use async_trait::async_trait;
use essay_grader::llm::{
    CompletionRequest, CompletionResponse, LlmError, LlmGateway, LlmProvider, LlmResult,
};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub const TEST_MODEL: &str = "test-model";

/// One scripted reply
#[derive(Debug, Clone)]
pub enum Reply {
    Text(String),
    ApiError { status: u16, message: String },
}

impl Reply {
    pub fn text(content: impl Into<String>) -> Self {
        Reply::Text(content.into())
    }

    pub fn score(value: &str) -> Self {
        Reply::Text(format!("Pontuação: {}\nExplicação da nota.", value))
    }

    pub fn api_error(status: u16, message: impl Into<String>) -> Self {
        Reply::ApiError {
            status,
            message: message.into(),
        }
    }
}

/// Provider that answers from a queue of replies
#[derive(Clone, Default)]
pub struct ScriptedLlm {
    replies: Arc<Mutex<VecDeque<Reply>>>,
    prompts: Arc<Mutex<Vec<String>>>,
}

impl ScriptedLlm {
    pub fn new(replies: Vec<Reply>) -> Self {
        Self {
            replies: Arc::new(Mutex::new(replies.into())),
            prompts: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }

    pub fn remaining(&self) -> usize {
        self.replies.lock().unwrap().len()
    }

    /// Gateway over a clone of this provider with a generous timeout
    pub fn gateway(&self) -> LlmGateway {
        LlmGateway::new(Arc::new(self.clone()), Duration::from_secs(5))
    }
}

#[async_trait]
impl LlmProvider for ScriptedLlm {
    fn name(&self) -> &str {
        "scripted"
    }

    fn default_model(&self) -> &str {
        TEST_MODEL
    }

    async fn complete(&self, request: &CompletionRequest) -> LlmResult<CompletionResponse> {
        self.prompts.lock().unwrap().push(request.prompt.clone());
        let reply = self.replies.lock().unwrap().pop_front();

        match reply {
            Some(Reply::Text(content)) => Ok(CompletionResponse::text(content, TEST_MODEL)),
            Some(Reply::ApiError { status, message }) => Err(LlmError::Api { status, message }),
            None => Err(LlmError::Api {
                status: 500,
                message: "script exhausted".to_string(),
            }),
        }
    }
}

/// Provider that sleeps far longer than any test timeout
pub struct SlowLlm {
    pub delay: Duration,
}

#[async_trait]
impl LlmProvider for SlowLlm {
    fn name(&self) -> &str {
        "slow"
    }

    fn default_model(&self) -> &str {
        TEST_MODEL
    }

    async fn complete(&self, _request: &CompletionRequest) -> LlmResult<CompletionResponse> {
        tokio::time::sleep(self.delay).await;
        Ok(CompletionResponse::text("Pontuação: 1.0", TEST_MODEL))
    }
}
