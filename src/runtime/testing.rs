//! A scripted [`ChatBackend`] for tests.
//!
//! Replies are queued up front and handed out in order; every request the
//! runner sends is recorded so tests can inspect prompts and tool lists.

use std::collections::VecDeque;
use std::sync::Mutex;

use genai::chat::{ChatRequest, ToolCall};

use super::{ChatBackend, ChatTurn, TurnUsage};
use crate::error::RuntimeError;

impl ChatTurn {
    /// A plain text reply.
    pub fn reply(text: &str) -> Self {
        Self {
            text: Some(text.to_string()),
            ..Self::default()
        }
    }

    /// A reply that calls one tool.
    pub fn tool_call(call_id: &str, fn_name: &str, fn_arguments: serde_json::Value) -> Self {
        Self {
            tool_calls: vec![ToolCall {
                call_id: call_id.to_string(),
                fn_name: fn_name.to_string(),
                fn_arguments,
                thought_signatures: None,
            }],
            ..Self::default()
        }
    }

    pub fn with_usage(mut self, prompt_tokens: u64, completion_tokens: u64) -> Self {
        self.usage = TurnUsage {
            prompt_tokens,
            completion_tokens,
        };
        self
    }
}

#[derive(Default)]
pub struct ScriptedBackend {
    replies: Mutex<VecDeque<Result<ChatTurn, String>>>,
    requests: Mutex<Vec<(String, ChatRequest)>>,
}

impl ScriptedBackend {
    pub fn new(replies: Vec<ChatTurn>) -> Self {
        Self {
            replies: Mutex::new(replies.into_iter().map(Ok).collect()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Queue a backend failure.
    pub fn push_error(&self, message: &str) {
        self.replies
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push_back(Err(message.to_string()));
    }

    /// Every `(model, request)` received so far.
    pub fn requests(&self) -> Vec<(String, ChatRequest)> {
        self.requests
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    pub fn remaining(&self) -> usize {
        self.replies.lock().unwrap_or_else(|e| e.into_inner()).len()
    }
}

impl ChatBackend for ScriptedBackend {
    async fn complete(&self, model: &str, request: ChatRequest) -> Result<ChatTurn, RuntimeError> {
        self.requests
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push((model.to_string(), request));

        let next = self
            .replies
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .pop_front();
        match next {
            Some(Ok(turn)) => Ok(turn),
            Some(Err(message)) => Err(RuntimeError::LlmError(message)),
            None => Err(RuntimeError::LlmError("scripted backend has no replies left".into())),
        }
    }
}
