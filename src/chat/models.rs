//! The core models for managing a stateful chat with an LLM.
use std::num::NonZeroUsize;

use crate::openai::{Message, Role};

/// Ordered history of a conversation. An optional system message
/// always sits at the front and is never evicted.
#[derive(Clone, Debug, Default)]
pub struct Transcript {
    messages: Vec<Message>,
    max_turns: Option<NonZeroUsize>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep at most `max_turns` non-system messages, dropping the
    /// oldest first.
    pub fn with_max_turns(mut self, max_turns: Option<NonZeroUsize>) -> Self {
        self.max_turns = max_turns;
        self.evict();
        self
    }

    pub fn messages(&self) -> Vec<Message> {
        self.messages.clone()
    }

    /// Appends a message and returns how many old messages were
    /// evicted to make room.
    pub fn push(&mut self, msg: Message) -> usize {
        self.messages.push(msg);
        self.evict()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn has_system(&self) -> bool {
        self.messages
            .first()
            .is_some_and(|m| m.role() == Role::System)
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Message> {
        self.messages.iter()
    }

    fn evict(&mut self) -> usize {
        let Some(max) = self.max_turns else {
            return 0;
        };
        let mut evicted = 0;
        while self
            .messages
            .iter()
            .filter(|m| m.role() != Role::System)
            .count()
            > max.get()
        {
            match self.messages.iter().position(|m| m.role() != Role::System) {
                Some(idx) => {
                    self.messages.remove(idx);
                    evicted += 1;
                }
                None => break,
            }
        }
        if evicted > 0 {
            tracing::debug!("Evicted {} messages from transcript", evicted);
        }
        evicted
    }
}
