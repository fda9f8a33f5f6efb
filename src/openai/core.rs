use std::time::Duration;

use async_trait::async_trait;
use http::{HeaderMap, StatusCode, header};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::error::CompletionError;
use super::inspect::{BoxedHttpObserver, ReceivedResponse};

#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Eq)]
pub enum Role {
    #[serde(rename = "system")]
    System,
    #[serde(rename = "assistant")]
    Assistant,
    #[serde(rename = "user")]
    User,
}

#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
pub struct ImageUrl {
    pub url: String,
}

/// One piece of a multimodal message.
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentPart {
    Text { text: String },
    ImageUrl { image_url: ImageUrl },
}

impl ContentPart {
    pub fn text(text: &str) -> Self {
        ContentPart::Text {
            text: text.to_string(),
        }
    }

    pub fn image_url(url: &str) -> Self {
        ContentPart::ImageUrl {
            image_url: ImageUrl {
                url: url.to_string(),
            },
        }
    }
}

// Plain strings serialize as `"content": "..."` and multimodal
// messages as `"content": [{"type": ...}, ...]`
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
#[serde(untagged)]
pub enum Content {
    Text(String),
    Parts(Vec<ContentPart>),
}

#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
pub struct Message {
    role: Role,
    content: Content,
}

impl Message {
    pub fn new(role: Role, content: &str) -> Self {
        Message {
            role,
            content: Content::Text(content.to_string()),
        }
    }

    pub fn new_with_parts(role: Role, parts: Vec<ContentPart>) -> Self {
        Message {
            role,
            content: Content::Parts(parts),
        }
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn content(&self) -> &Content {
        &self.content
    }

    /// The text body, `None` for multimodal messages.
    pub fn text(&self) -> Option<&str> {
        match &self.content {
            Content::Text(text) => Some(text.as_str()),
            Content::Parts(_) => None,
        }
    }
}

/// Sampling settings that stay fixed for a whole session.
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
pub struct GenerationParams {
    pub model: String,
    pub max_tokens: u32,
    pub frequency_penalty: f64,
    pub top_p: f64,
    pub temperature: f64,
}

impl GenerationParams {
    /// Settings for the interactive text chat.
    pub fn chat(model: &str) -> Self {
        Self {
            model: model.to_string(),
            max_tokens: 256,
            frequency_penalty: 1.0,
            top_p: 0.1,
            temperature: 0.1,
        }
    }

    /// Settings for one-shot image description. Greedy decoding with a
    /// short answer.
    pub fn vision(model: &str) -> Self {
        Self {
            model: model.to_string(),
            max_tokens: 32,
            frequency_penalty: 1.0,
            top_p: 0.1,
            temperature: 0.0,
        }
    }
}

#[derive(Clone, Serialize, Debug)]
pub struct CompletionRequest {
    #[serde(flatten)]
    pub params: GenerationParams,
    pub messages: Vec<Message>,
}

impl CompletionRequest {
    pub fn new(params: &GenerationParams, messages: Vec<Message>) -> Self {
        Self {
            params: params.clone(),
            messages,
        }
    }
}

/// Text of the first choice returned by the server.
#[derive(Clone, Debug, PartialEq)]
pub struct Completion {
    pub content: String,
    pub finish_reason: Option<String>,
}

/// Anything that can turn a request into the next assistant message.
#[async_trait]
pub trait ChatCompletion: Send + Sync {
    async fn complete(&self, request: &CompletionRequest) -> Result<Completion, CompletionError>;
}

/// HTTP client for an OpenAI compatible `/chat/completions` endpoint.
pub struct Client {
    http: reqwest::Client,
    api_base_url: String,
    api_key: String,
    timeout: Duration,
    observer: Option<BoxedHttpObserver>,
}

impl Client {
    pub fn new(api_base_url: &str, api_key: &str, timeout: Duration) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_base_url: api_base_url.to_string(),
            api_key: api_key.to_string(),
            timeout,
            observer: None,
        }
    }

    pub fn with_observer(mut self, observer: BoxedHttpObserver) -> Self {
        self.observer = Some(observer);
        self
    }

    pub fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.api_base_url.trim_end_matches('/'))
    }

    pub async fn completion(
        &self,
        payload: &CompletionRequest,
    ) -> Result<Completion, CompletionError> {
        let request = self
            .http
            .post(self.endpoint())
            .bearer_auth(&self.api_key)
            .header("Content-Type", "application/json")
            .timeout(self.timeout)
            .json(payload)
            .build()?;

        tracing::debug!(
            "Requesting completion from {} with {} messages",
            request.url(),
            payload.messages.len()
        );

        if let Some(observer) = &self.observer {
            observer.before_send(&request);
        }

        let response = self.http.execute(request).await?;
        let status = response.status();
        let headers = response.headers().clone();
        let body = response.bytes().await?;

        if let Some(observer) = &self.observer {
            observer.after_receive(&ReceivedResponse {
                status,
                headers: &headers,
                body: &body,
            });
        }

        parse_completion(status, &headers, &body)
    }
}

#[async_trait]
impl ChatCompletion for Client {
    async fn complete(&self, request: &CompletionRequest) -> Result<Completion, CompletionError> {
        self.completion(request).await
    }
}

fn parse_completion(
    status: StatusCode,
    headers: &HeaderMap,
    body: &[u8],
) -> Result<Completion, CompletionError> {
    if status == StatusCode::TOO_MANY_REQUESTS {
        let retry_after = headers
            .get(header::RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .map(String::from);
        return Err(CompletionError::RateLimited { retry_after });
    }
    if !status.is_success() {
        return Err(CompletionError::Status {
            status: status.as_u16(),
            body: String::from_utf8_lossy(body).into_owned(),
        });
    }

    let resp: Value = serde_json::from_slice(body)
        .map_err(|e| CompletionError::InvalidResponse(format!("Body is not JSON: {}", e)))?;

    let choice = &resp["choices"][0];
    let content = choice["message"]["content"].as_str().ok_or_else(|| {
        CompletionError::InvalidResponse(format!("No message received. Resp: {}", resp))
    })?;
    let finish_reason = choice["finish_reason"].as_str().map(String::from);

    tracing::debug!("Completion finished with reason {:?}", finish_reason);

    Ok(Completion {
        content: content.to_string(),
        finish_reason,
    })
}
