//! Rendering and parsing of the transcript markup.
//!
//! A turn renders to a `<div class="message user-message">` (or
//! `assistant-message`) fragment that is appended to the growing
//! transcript. Parsing walks those containers back into a message
//! list. The round-trip is lossy by design: only the role and the
//! flattened text survive, with `<br>` markers standing in for
//! newlines.

use scraper::{ElementRef, Html, Node, Selector};
use tiny_chat_model::{ChatMessage, Role};

const USER_CLASS: &str = "user-message";
const ASSISTANT_CLASS: &str = "assistant-message";

/// Renders one turn as a transcript fragment.
///
/// Markup-significant characters in the content are escaped and
/// literal newlines become `<br>` markers. The fragment is meant to be
/// appended to the transcript, never to replace it.
pub fn render(role: Role, content: &str) -> String {
    let class = match role {
        Role::User => USER_CLASS,
        _ => ASSISTANT_CLASS,
    };
    let escaped = escape_html(content).replace('\n', "<br>");
    format!(r#"<div class="message {class}">{escaped}</div>"#)
}

/// Reconstructs the message list from rendered transcript markup.
///
/// Message containers are read in document order. The role comes from
/// the container's class list and the content from its flattened text,
/// with `<br>` markers restored to newlines and surrounding whitespace
/// trimmed. Containers carrying neither role class are skipped. A
/// system message is never rendered, so parsing never yields one.
pub fn parse(markup: &str) -> Vec<ChatMessage> {
    let doc = Html::parse_fragment(markup);
    let selector =
        Selector::parse("div.message").expect("static selector must parse");

    let mut messages = Vec::new();
    for element in doc.select(&selector) {
        let el = element.value();
        let role = if el.classes().any(|c| c == USER_CLASS) {
            Role::User
        } else if el.classes().any(|c| c == ASSISTANT_CLASS) {
            Role::Assistant
        } else {
            continue;
        };

        let mut content = String::new();
        flatten_text(element, &mut content);
        messages.push(ChatMessage::new(role, content.trim()));
    }
    messages
}

fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#x27;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

fn flatten_text(element: ElementRef<'_>, out: &mut String) {
    for child in element.children() {
        match child.value() {
            Node::Text(text) => out.push_str(text),
            Node::Element(el) if el.name() == "br" => out.push('\n'),
            Node::Element(_) => {
                if let Some(child_el) = ElementRef::wrap(child) {
                    flatten_text(child_el, out);
                }
            }
            _ => {}
        }
    }
}
