//! An abstraction layer for chat-completion backends.
//!
//! This crate establishes the protocol between the conversation core and
//! the remote chat-completion service: message and request types, the
//! fragment type for streamed deltas, and the traits a backend should
//! implement.
//!
//! Types in this crate don't define any behavior, instead they are the
//! constraints that the implementors should adhere to. Notably, a
//! [`ChatReply`] cannot fail: a backend degrades every failure into a
//! visible fragment within the stream, so that no turn ever aborts the
//! process.

#![deny(missing_docs)]

mod backend;
mod fragment;
mod message;
mod request;

pub use backend::*;
pub use fragment::*;
pub use message::*;
pub use request::*;
