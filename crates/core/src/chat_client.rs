use std::pin::Pin;
use std::sync::Arc;

use tiny_chat_model::{ChatBackend, ChatReply, ChatRequest};

/// A boxed, type-erased streamed reply.
pub type BoxedReply = Pin<Box<dyn ChatReply>>;

type OpenStreamFuture = Pin<Box<dyn Future<Output = BoxedReply> + Send>>;
type HandlerFn = Arc<dyn Fn(ChatRequest) -> OpenStreamFuture + Send + Sync>;

/// A wrapper around a chat backend that provides a type-erased
/// interface for the other modules.
#[derive(Clone)]
pub struct ChatClient {
    handler_fn: HandlerFn,
}

impl ChatClient {
    /// Creates a client over the given backend.
    #[inline]
    pub fn new<B: ChatBackend + 'static>(backend: B) -> Self {
        // We have to erase the type `B`, since `ChatClient` doesn't
        // have a generic parameter and we don't want it either.
        let handler_fn: HandlerFn = Arc::new(move |req| {
            trace!("opening a stream: {req:?}");
            let fut = backend.stream_chat(&req);
            Box::pin(async move {
                let reply = fut.await;
                Box::pin(reply) as BoxedReply
            })
        });
        Self { handler_fn }
    }

    /// Opens a streamed completion for the given request.
    ///
    /// The reply is finite and not restartable; calling this again
    /// opens a fresh connection.
    #[inline]
    pub async fn open_stream(&self, req: ChatRequest) -> BoxedReply {
        (self.handler_fn)(req).await
    }
}

#[cfg(test)]
mod tests {
    use std::future::poll_fn;

    use tiny_chat_model::ChatMessage;
    use tiny_chat_test_backend::{PresetReply, ScriptedBackend};

    use super::*;

    #[tokio::test]
    async fn test_open_stream() {
        let mut backend = ScriptedBackend::default();
        backend.add_user_step();
        backend.add_reply_step(PresetReply::with_fragments([
            "How ".to_owned(),
            "are ".to_owned(),
            "you?".to_owned(),
        ]));

        let client = ChatClient::new(backend);

        // The client is reusable: every call opens an independent
        // reply.
        for _ in 0..3 {
            let req = ChatRequest {
                model: "scripted".to_owned(),
                messages: vec![ChatMessage::user("Hi")],
                temperature: 0.7,
                max_tokens: 2048,
            };
            let mut reply = client.open_stream(req).await;
            let mut content = String::new();
            while let Some(fragment) =
                poll_fn(|cx| reply.as_mut().poll_next_fragment(cx)).await
            {
                content.push_str(fragment.as_str());
            }
            assert_eq!(content, "How are you?");
        }
    }
}
