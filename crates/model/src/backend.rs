use std::pin::Pin;
use std::task::{self, Poll};

use crate::fragment::StreamFragment;
use crate::request::ChatRequest;

/// A streamed reply from a chat backend.
///
/// The reply is a finite, non-restartable sequence of fragments. It is
/// infallible by contract: backends must degrade every failure (bad
/// status, transport drop, malformed payload) into either a skipped
/// line or a visible fragment, so that polling a reply can never abort
/// the turn.
pub trait ChatReply: Send + 'static {
    /// Attempts to pull out the next fragment from the reply.
    ///
    /// # Return value
    ///
    /// - `Poll::Pending` means the reply is still waiting for the next
    ///   streamed line. Implementations will ensure that the current
    ///   task is notified when more data may be ready.
    /// - `Poll::Ready(Some(fragment))` delivers the next fragment, and
    ///   the reply may produce further fragments on subsequent calls.
    /// - `Poll::Ready(None)` means the reply has completed.
    ///
    /// Calling this method after completion should always return
    /// `None`.
    fn poll_next_fragment(
        self: Pin<&mut Self>,
        cx: &mut task::Context<'_>,
    ) -> Poll<Option<StreamFragment>>;
}

/// A type that represents a chat-completion backend.
///
/// Once the backend is created, it should behave like a stateless
/// object: every call to [`stream_chat`](ChatBackend::stream_chat)
/// opens a fresh connection and returns an independent reply.
pub trait ChatBackend: Send + Sync {
    /// The reply type for this backend.
    type Reply: ChatReply;

    /// Opens a streamed completion for the given request.
    ///
    /// The returned future resolves once the connection attempt has
    /// settled. Connection failures are not surfaced here: they are
    /// folded into the reply as a single descriptive fragment.
    fn stream_chat(
        &self,
        req: &ChatRequest,
    ) -> impl Future<Output = Self::Reply> + Send + 'static;
}
