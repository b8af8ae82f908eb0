//! genai-backed [`ChatBackend`].
//!
//! The provider is chosen by genai from the model name (e.g. `gpt-4o-mini`,
//! `claude-3-5-haiku-latest`, `llama3.2` for Ollama); API keys come from the
//! provider's usual environment variables.

use futures::StreamExt;
use genai::chat::{ChatOptions, ChatRequest, ChatStreamEvent};
use genai::Client;

use super::{ChatBackend, ChatTurn, TurnUsage};
use crate::error::RuntimeError;

pub struct GenaiBackend {
    client: Client,
    options: ChatOptions,
}

impl Default for GenaiBackend {
    fn default() -> Self {
        Self {
            client: Client::default(),
            options: ChatOptions::default()
                .with_capture_content(true)
                .with_capture_tool_calls(true)
                .with_capture_usage(true),
        }
    }
}

impl ChatBackend for GenaiBackend {
    async fn complete(&self, model: &str, request: ChatRequest) -> Result<ChatTurn, RuntimeError> {
        let stream_res = self
            .client
            .exec_chat_stream(model, request, Some(&self.options))
            .await
            .map_err(|e| RuntimeError::LlmError(e.to_string()))?;

        let mut stream = stream_res.stream;
        let mut turn = ChatTurn::default();

        while let Some(event) = stream.next().await {
            match event {
                Ok(ChatStreamEvent::Chunk(chunk)) => {
                    tracing::trace!(chunk = %chunk.content, "LLM chunk");
                }
                Ok(ChatStreamEvent::End(end)) => {
                    if let Some(text) = end.captured_first_text() {
                        turn.text = Some(text.to_string());
                    }
                    if let Some(calls) = end.captured_tool_calls() {
                        turn.tool_calls = calls.into_iter().cloned().collect();
                    }
                    if let Some(usage) = &end.captured_usage {
                        turn.usage = TurnUsage {
                            prompt_tokens: usage.prompt_tokens.unwrap_or(0).max(0) as u64,
                            completion_tokens: usage.completion_tokens.unwrap_or(0).max(0) as u64,
                        };
                    }
                }
                Ok(_) => {}
                Err(e) => {
                    // The End event may still arrive.
                    tracing::warn!("LLM stream error: {e}");
                }
            }
        }

        Ok(turn)
    }
}
