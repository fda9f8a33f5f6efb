use std::num::NonZeroUsize;

use super::models::Transcript;
use super::normalize::{Normalized, normalize};
use crate::openai::{
    ChatCompletion, CompletionError, CompletionRequest, GenerationParams, Message, Role,
};

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("A system prompt has already been set for this session")]
    SystemPromptAlreadySet,

    #[error("The system prompt must be set before the first turn")]
    SystemPromptAfterFirstTurn,

    #[error(transparent)]
    Completion(#[from] CompletionError),
}

/// A single interactive conversation with a model.
///
/// Every turn sends the whole transcript along with the same
/// generation parameters and stores the normalized reply. The reply
/// is stored with its end-of-sequence sentinel removed but without
/// the `...` shown for truncated output, so the model sees exactly
/// what it generated.
///
/// Use `SessionBuilder` to construct a `Session`.
pub struct Session<C: ChatCompletion> {
    client: C,
    params: GenerationParams,
    transcript: Transcript,
}

impl<C: ChatCompletion> Session<C> {
    /// Sets the optional system prompt. Empty prompts are skipped and
    /// return `false`.
    pub fn set_system_prompt(&mut self, prompt: &str) -> Result<bool, SessionError> {
        if prompt.is_empty() {
            return Ok(false);
        }
        if self.transcript.has_system() {
            return Err(SessionError::SystemPromptAlreadySet);
        }
        if !self.transcript.is_empty() {
            return Err(SessionError::SystemPromptAfterFirstTurn);
        }
        self.transcript.push(Message::new(Role::System, prompt));
        Ok(true)
    }

    /// Runs the next turn: records the user input, asks the model for
    /// a reply and records the reply. On failure the user message
    /// stays in the transcript.
    pub async fn next_turn(&mut self, input: &str) -> Result<Normalized, SessionError> {
        self.transcript.push(Message::new(Role::User, input));

        let request = CompletionRequest::new(&self.params, self.transcript.messages());
        let completion = self.client.complete(&request).await?;

        let reply = normalize(&completion.content);
        if reply.is_truncated() {
            tracing::debug!(
                "Reply hit max_tokens={} (finish_reason={:?})",
                self.params.max_tokens,
                completion.finish_reason
            );
        }

        self.transcript
            .push(Message::new(Role::Assistant, reply.text()));

        Ok(reply)
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn client(&self) -> &C {
        &self.client
    }
}

pub struct SessionBuilder {
    params: GenerationParams,
    max_turns: Option<NonZeroUsize>,
}

impl SessionBuilder {
    pub fn new(params: GenerationParams) -> Self {
        Self {
            params,
            max_turns: None,
        }
    }

    pub fn max_turns(mut self, max_turns: Option<NonZeroUsize>) -> Self {
        self.max_turns = max_turns;
        self
    }

    pub fn build<C: ChatCompletion>(self, client: C) -> Session<C> {
        Session {
            client,
            params: self.params,
            transcript: Transcript::new().with_max_turns(self.max_turns),
        }
    }
}
