//! Core conversation logic: the transcript codec, the structured
//! conversation state, and the drivers for a chat turn.
//!
//! Two drivers are provided. [`ChatController`] keeps the conversation
//! as a structured message list and derives the rendered transcript
//! from it. [`ChatSurface`] serves stateless presentation layers whose
//! only state is the rendered markup itself, reconstructing the
//! message list from that markup on every turn.

#![deny(missing_docs)]

#[macro_use]
extern crate tracing;

mod chat_client;
pub mod conversation;
mod controller;
mod surface;
pub mod transcript;

pub use chat_client::{BoxedReply, ChatClient};
pub use controller::{ChatController, TurnStream};
pub use surface::{ChatSurface, SurfaceUpdate, TurnUpdates};
