//! Test utilities for integration tests
#![allow(dead_code)]
use std::collections::VecDeque;
use std::time::Duration;

use anyhow::Result;
use serde_json::json;

use lmchat::cli::chat::LineSource;
use lmchat::core::AppConfig;
use lmchat::openai::Client;

/// An OpenAI compatible response body with a single choice.
pub fn completion_body(content: &str) -> String {
    json!({
        "id": "chatcmpl-123",
        "object": "chat.completion",
        "created": 1694268190,
        "model": "mistral",
        "choices": [{
            "index": 0,
            "message": {
                "role": "assistant",
                "content": content
            },
            "finish_reason": "stop"
        }]
    })
    .to_string()
}

/// The exact body the chat loop sends for `messages` with the default
/// chat settings.
pub fn chat_request_body(messages: serde_json::Value) -> serde_json::Value {
    json!({
        "model": "mistral",
        "max_tokens": 256,
        "frequency_penalty": 1.0,
        "top_p": 0.1,
        "temperature": 0.1,
        "messages": messages
    })
}

/// Config pointed at a mock server.
pub fn test_config(server: &mockito::ServerGuard) -> AppConfig {
    AppConfig {
        api_base_url: format!("{}/v1/", server.url()),
        api_key: String::from("EMPTY"),
        request_timeout: Duration::from_secs(5),
        max_turns: None,
    }
}

pub fn test_client(server: &mockito::ServerGuard) -> Client {
    let config = test_config(server);
    Client::new(&config.api_base_url, &config.api_key, config.request_timeout)
}

/// Operator input that replays fixed lines and then signals EOF.
pub struct ScriptedInput {
    lines: VecDeque<String>,
    pub prompts: Vec<String>,
}

impl ScriptedInput {
    pub fn new(lines: &[&str]) -> Self {
        Self {
            lines: lines.iter().map(|l| l.to_string()).collect(),
            prompts: Vec::new(),
        }
    }
}

impl LineSource for ScriptedInput {
    fn read_line(&mut self, prompt: &str) -> Result<Option<String>> {
        self.prompts.push(prompt.to_string());
        Ok(self.lines.pop_front())
    }
}
