use crate::message::ChatMessage;

/// A completion request to be sent to the backend.
///
/// The message list is the conversation history as the caller knows it.
/// Backends prepend their configured system message themselves, so the
/// history here should only contain user and assistant turns.
#[derive(Clone, Debug, PartialEq)]
pub struct ChatRequest {
    /// The model identifier to sample from.
    pub model: String,
    /// The input messages, oldest first.
    pub messages: Vec<ChatMessage>,
    /// The sampling temperature.
    pub temperature: f32,
    /// The maximum number of tokens to generate.
    pub max_tokens: u32,
}

/// The per-turn knobs supplied by the presentation layer.
#[derive(Clone, Debug, PartialEq)]
pub struct TurnOptions {
    /// The model identifier to sample from.
    pub model: String,
    /// The sampling temperature.
    pub temperature: f32,
    /// The maximum number of tokens to generate.
    pub max_tokens: u32,
}

impl TurnOptions {
    /// Builds a [`ChatRequest`] from these options and a history.
    #[inline]
    pub fn request(&self, messages: Vec<ChatMessage>) -> ChatRequest {
        ChatRequest {
            model: self.model.clone(),
            messages,
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        }
    }
}
