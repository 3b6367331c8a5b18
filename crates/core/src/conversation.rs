//! Conversation state.

use tiny_chat_model::ChatMessage;

use crate::transcript;

/// An ordered conversation history.
///
/// Only user and assistant turns live here: the system message belongs
/// to the backend and is never part of the conversation. Nothing is
/// persisted; a reset clears everything and a process restart starts
/// from scratch.
#[derive(Clone, Default, Debug)]
pub struct Conversation {
    messages: Vec<ChatMessage>,
}

impl Conversation {
    /// Returns the messages in submission order.
    #[inline]
    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    /// Returns `true` if there are no messages.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Appends a message.
    #[inline]
    pub fn push(&mut self, msg: ChatMessage) {
        self.messages.push(msg);
    }

    /// Removes all messages.
    #[inline]
    pub fn clear(&mut self) {
        self.messages.clear();
    }

    /// Derives the rendered transcript for the whole history.
    pub fn render_html(&self) -> String {
        self.messages
            .iter()
            .map(|msg| transcript::render(msg.role, &msg.content))
            .collect()
    }
}
