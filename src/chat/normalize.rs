//! Post-processing of raw completion text.
//!
//! Local model servers leave the end-of-sequence token in the output
//! when generation stops on its own. If none is present the model ran
//! into `max_tokens` and the answer is cut off.

/// End-of-sequence markers, checked in this order.
pub const SENTINELS: [&str; 2] = ["</s>", "<eos>"];

/// Appended to displayed text that was cut off by the length limit.
pub const TRUNCATION_MARKER: &str = "...";

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Normalized {
    /// Generation ended naturally, the sentinel has been removed.
    Finished(String),
    /// Generation hit the output limit, text is unmodified.
    Truncated(String),
}

impl Normalized {
    /// The text without any display decoration.
    pub fn text(&self) -> &str {
        match self {
            Normalized::Finished(text) | Normalized::Truncated(text) => text,
        }
    }

    pub fn is_truncated(&self) -> bool {
        matches!(self, Normalized::Truncated(_))
    }

    /// What the operator sees.
    pub fn display(&self) -> String {
        match self {
            Normalized::Finished(text) => text.clone(),
            Normalized::Truncated(text) => format!("{}{}", text, TRUNCATION_MARKER),
        }
    }
}

pub fn normalize(raw: &str) -> Normalized {
    for sentinel in SENTINELS {
        if let Some(stripped) = raw.strip_suffix(sentinel) {
            return Normalized::Finished(stripped.to_string());
        }
    }
    Normalized::Truncated(raw.to_string())
}
