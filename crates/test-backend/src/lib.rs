//! A local fake chat backend for testing purpose.

mod preset;

use std::collections::VecDeque;
use std::future::ready;
use std::pin::Pin;
use std::task::{Context, Poll, ready};
use std::time::Duration;

use tiny_chat_model::{ChatBackend, ChatReply, ChatRequest, StreamFragment};
use tokio::time::{Sleep, sleep};

pub use preset::*;

/// The reply produced by [`ScriptedBackend`].
pub struct ScriptedReply {
    fragments: VecDeque<String>,
    delay: Option<Duration>,
    sleep: Option<Pin<Box<Sleep>>>,
}

impl ChatReply for ScriptedReply {
    fn poll_next_fragment(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
    ) -> Poll<Option<StreamFragment>> {
        // SAFETY: This type does not require to be pinned.
        let this = unsafe { self.get_unchecked_mut() };

        if let Some(delay) = this.delay {
            let Some(sleep_fut) = &mut this.sleep else {
                this.sleep = Some(Box::pin(sleep(delay)));
                return Pin::new(this).poll_next_fragment(cx);
            };
            ready!(sleep_fut.as_mut().poll(cx));
            this.sleep = None;
        }

        Poll::Ready(this.fragments.pop_front().map(StreamFragment::from))
    }
}

#[derive(Clone)]
enum ScriptStep {
    UserInput,
    Reply(PresetReply),
}

/// A local fake chat backend for testing purpose.
///
/// Before sending requests, you need to set up the conversation
/// script, which is how the backend should respond to a request. The
/// added steps will be selected according to the history messages in
/// your request. A request that steps outside the script degrades to a
/// visible error fragment, the way the real backend folds failures
/// into the stream.
///
/// # Note
///
/// This type is not optimized for production use, there are heavy
/// memory copies involved. You should only use it for testing.
#[derive(Clone, Default)]
pub struct ScriptedBackend {
    script: Vec<ScriptStep>,
    delay: Option<Duration>,
}

impl ScriptedBackend {
    /// Adds a step representing a user input.
    #[inline]
    pub fn add_user_step(&mut self) {
        self.script.push(ScriptStep::UserInput);
    }

    /// Adds a scripted assistant reply step.
    #[inline]
    pub fn add_reply_step(&mut self, preset: PresetReply) {
        self.script.push(ScriptStep::Reply(preset));
    }

    /// Delays every fragment by the given duration.
    #[inline]
    pub fn set_delay(&mut self, duration: Duration) {
        self.delay = Some(duration);
    }
}

impl ChatBackend for ScriptedBackend {
    type Reply = ScriptedReply;

    fn stream_chat(
        &self,
        req: &ChatRequest,
    ) -> impl Future<Output = Self::Reply> + Send + 'static {
        let step_idx = req.messages.len();
        let fragments = match self.script.get(step_idx) {
            Some(ScriptStep::Reply(preset)) => {
                VecDeque::from(preset.fragments.clone())
            }
            Some(ScriptStep::UserInput) => VecDeque::from([
                "[request error: script expects a user input here]".to_owned(),
            ]),
            None => VecDeque::from([
                "[request error: no more scripted replies]".to_owned(),
            ]),
        };
        ready(ScriptedReply {
            fragments,
            delay: self.delay,
            sleep: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::future::poll_fn;
    use std::pin::pin;

    use tiny_chat_model::ChatMessage;

    use super::*;

    fn request(messages: Vec<ChatMessage>) -> ChatRequest {
        ChatRequest {
            model: "scripted".to_owned(),
            messages,
            temperature: 0.7,
            max_tokens: 2048,
        }
    }

    async fn collect_reply(reply: ScriptedReply) -> String {
        let mut reply = pin!(reply);
        let mut content = String::new();
        while let Some(fragment) =
            poll_fn(|cx| reply.as_mut().poll_next_fragment(cx)).await
        {
            content.push_str(fragment.as_str());
        }
        content
    }

    #[tokio::test]
    async fn test_scripted_conversation() {
        let mut backend = ScriptedBackend::default();
        backend.add_user_step();
        backend.add_reply_step(PresetReply::with_fragments([
            "Hello, ".to_owned(),
            "world!".to_owned(),
        ]));
        backend.add_user_step();
        backend.add_reply_step(PresetReply::with_fragments([
            "Bye!".to_owned(),
        ]));

        let mut messages = vec![ChatMessage::user("Hi")];
        let reply = backend.stream_chat(&request(messages.clone())).await;
        let content = collect_reply(reply).await;
        assert_eq!(content, "Hello, world!");

        messages.push(ChatMessage::assistant(content));
        messages.push(ChatMessage::user("See you"));
        let reply = backend.stream_chat(&request(messages)).await;
        assert_eq!(collect_reply(reply).await, "Bye!");
    }

    #[tokio::test]
    async fn test_out_of_script_degrades_to_error_fragment() {
        let backend = ScriptedBackend::default();
        let reply = backend.stream_chat(&request(vec![])).await;
        assert_eq!(
            collect_reply(reply).await,
            "[request error: no more scripted replies]"
        );
    }

    #[tokio::test]
    async fn test_delayed_fragments() {
        let mut backend = ScriptedBackend::default();
        backend.add_user_step();
        backend.add_reply_step(PresetReply::with_fragments([
            "slow".to_owned(),
        ]));
        backend.set_delay(Duration::from_millis(1));

        let reply = backend
            .stream_chat(&request(vec![ChatMessage::user("Hi")]))
            .await;
        assert_eq!(collect_reply(reply).await, "slow");
    }
}
