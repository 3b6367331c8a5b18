use std::collections::VecDeque;
use std::pin::Pin;
use std::task::{Context, Poll, ready};

use pin_project_lite::pin_project;
use tiny_chat_model::{ChatReply, StreamFragment};

use crate::io::Lines;
use crate::line::parse_line;

/// A line with exactly this trimmed content ends the stream.
const DONE_SENTINEL: &str = "[DONE]";

enum ReplySource {
    /// Lines still arriving from the wire.
    Streaming(Lines),
    /// Fragments already materialized (failure notices), drained in
    /// order. Also the terminal state, once empty.
    Queued(VecDeque<String>),
}

struct ReplyState {
    source: ReplySource,
}

impl ReplyState {
    #[inline]
    fn finished() -> Self {
        Self {
            source: ReplySource::Queued(VecDeque::new()),
        }
    }
}

async fn next_fragment(
    state: ReplyState,
) -> (Option<StreamFragment>, ReplyState) {
    let mut lines = match state.source {
        ReplySource::Queued(mut queue) => {
            let fragment = queue.pop_front().map(StreamFragment::from);
            return (
                fragment,
                ReplyState {
                    source: ReplySource::Queued(queue),
                },
            );
        }
        ReplySource::Streaming(lines) => lines,
    };

    loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => return (None, ReplyState::finished()),
            Err(err) => {
                // The sole error recovery: one visible notice, then the
                // sequence ends. Dropping the lines closes the
                // connection.
                warn!("transport failure mid-stream: {err}");
                let notice = format!("[request error: {err}]");
                return (Some(notice.into()), ReplyState::finished());
            }
        };

        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        if trimmed == DONE_SENTINEL {
            trace!("got stream terminator");
            return (None, ReplyState::finished());
        }

        match parse_line(&line) {
            Some(content) if !content.is_empty() => {
                let state = ReplyState {
                    source: ReplySource::Streaming(lines),
                };
                return (Some(content.into()), state);
            }
            _ => continue,
        }
    }
}

type PinnedFuture<T> = Pin<Box<dyn Future<Output = T> + Send>>;
type NextFragment = (Option<StreamFragment>, ReplyState);

pin_project! {
    /// A streamed reply from [`OpenAIBackend`](crate::OpenAIBackend).
    pub struct OpenAIReply {
        next_fragment_fut: Option<PinnedFuture<NextFragment>>,
    }
}

impl OpenAIReply {
    #[inline]
    pub(crate) fn streaming(lines: Lines) -> Self {
        Self::with_state(ReplyState {
            source: ReplySource::Streaming(lines),
        })
    }

    /// A reply that delivers a single failure notice, then ends.
    #[inline]
    pub(crate) fn failed(notice: String) -> Self {
        Self::with_state(ReplyState {
            source: ReplySource::Queued(VecDeque::from([notice])),
        })
    }

    fn with_state(state: ReplyState) -> Self {
        let next_fragment_fut = async move { next_fragment(state).await };
        Self {
            next_fragment_fut: Some(Box::pin(next_fragment_fut)),
        }
    }
}

impl ChatReply for OpenAIReply {
    fn poll_next_fragment(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
    ) -> Poll<Option<StreamFragment>> {
        let this = self.project();
        let Some(next_fragment_fut) = this.next_fragment_fut else {
            // The reply has been exhausted.
            return Poll::Ready(None);
        };
        let (fragment, state) = ready!(next_fragment_fut.as_mut().poll(cx));
        let Some(fragment) = fragment else {
            *this.next_fragment_fut = None;
            return Poll::Ready(None);
        };

        // The stream may still have more data to pull, create a new
        // future for the next fragment.
        let next_fragment_fut = async move { next_fragment(state).await };
        *this.next_fragment_fut = Some(Box::pin(next_fragment_fut));

        Poll::Ready(Some(fragment))
    }
}
