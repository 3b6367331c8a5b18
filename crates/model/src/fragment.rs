use std::fmt::{self, Display};

/// One incremental piece of assistant text delivered over a stream.
///
/// A fragment is produced by a single protocol line. Fragments
/// concatenate in arrival order to form the content of the assistant
/// message for the turn.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct StreamFragment(String);

impl StreamFragment {
    /// Returns the fragment text.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the fragment, returning the owned text.
    #[inline]
    pub fn into_string(self) -> String {
        self.0
    }

    /// Returns `true` if the fragment carries no text.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<String> for StreamFragment {
    #[inline]
    fn from(text: String) -> Self {
        Self(text)
    }
}

impl From<&str> for StreamFragment {
    #[inline]
    fn from(text: &str) -> Self {
        Self(text.to_owned())
    }
}

impl Display for StreamFragment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
