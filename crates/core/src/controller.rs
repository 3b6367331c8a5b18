use std::future::poll_fn;

use tiny_chat_model::{ChatMessage, Role, StreamFragment, TurnOptions};

use crate::chat_client::{BoxedReply, ChatClient};
use crate::conversation::Conversation;
use crate::transcript;

/// Drives a conversation turn by turn.
///
/// The controller keeps the conversation as a structured message list
/// and derives the rendered transcript from it. Each turn moves
/// `Idle → AwaitingReply → Idle`; while a [`TurnStream`] is alive it
/// borrows the controller exclusively, so a second submit before the
/// reply ends is rejected at compile time instead of racing on the
/// history.
pub struct ChatController {
    client: ChatClient,
    conversation: Conversation,
}

impl ChatController {
    /// Creates a controller over the given client.
    #[inline]
    pub fn new(client: ChatClient) -> Self {
        Self {
            client,
            conversation: Conversation::default(),
        }
    }

    /// Returns the conversation so far.
    #[inline]
    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    /// Renders the transcript for the conversation so far.
    #[inline]
    pub fn transcript_html(&self) -> String {
        self.conversation.render_html()
    }

    /// Submits a user turn.
    ///
    /// Whitespace-only input is ignored: nothing is recorded and no
    /// request is made (`None`; the caller still clears its input
    /// field). Otherwise the user message joins the history, a stream
    /// opens with the full history, and the returned handle yields the
    /// assistant reply fragment by fragment.
    pub async fn submit(
        &mut self,
        opts: &TurnOptions,
        user_text: &str,
    ) -> Option<TurnStream<'_>> {
        if user_text.trim().is_empty() {
            return None;
        }

        self.conversation.push(ChatMessage::user(user_text));
        let req = opts.request(self.conversation.messages().to_vec());
        let reply = self.client.open_stream(req).await;
        Some(TurnStream {
            controller: self,
            reply,
            content: String::new(),
            finished: false,
        })
    }

    /// Clears the conversation. Idempotent, legal at any time.
    #[inline]
    pub fn reset(&mut self) {
        self.conversation.clear();
    }
}

/// An in-flight assistant turn.
///
/// Dropping the stream is the only cancellation; whatever content has
/// accumulated by then is committed as the assistant message, matching
/// what was last rendered.
pub struct TurnStream<'a> {
    controller: &'a mut ChatController,
    reply: BoxedReply,
    content: String,
    finished: bool,
}

impl TurnStream<'_> {
    /// Pulls the next fragment, accumulating it into the turn content.
    ///
    /// After the sequence is exhausted the accumulated content becomes
    /// the permanent assistant message and further calls return
    /// `None`.
    pub async fn next_fragment(&mut self) -> Option<StreamFragment> {
        if self.finished {
            return None;
        }
        let fragment =
            poll_fn(|cx| self.reply.as_mut().poll_next_fragment(cx)).await;
        match fragment {
            Some(fragment) => {
                self.content.push_str(fragment.as_str());
                Some(fragment)
            }
            None => {
                self.commit();
                None
            }
        }
    }

    /// The assistant content accumulated so far.
    #[inline]
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Renders the transcript so far plus the in-flight assistant
    /// turn.
    ///
    /// Every call is a complete, consistent snapshot: all committed
    /// turns, then one assistant turn holding the current accumulator.
    pub fn snapshot_html(&self) -> String {
        let mut html = self.controller.transcript_html();
        html.push_str(&transcript::render(Role::Assistant, &self.content));
        html
    }

    fn commit(&mut self) {
        self.finished = true;
        if self.content.is_empty() {
            // A reply that carried no fragments leaves no assistant
            // turn behind.
            return;
        }
        self.controller
            .conversation
            .push(ChatMessage::assistant(std::mem::take(&mut self.content)));
    }
}

impl Drop for TurnStream<'_> {
    fn drop(&mut self) {
        if !self.finished {
            self.commit();
        }
    }
}
