use serde::{Deserialize, Serialize};

/// The scripted reply for one assistant step.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PresetReply {
    /// The fragments to stream, in order.
    pub fragments: Vec<String>,
}

impl PresetReply {
    /// Creates a `PresetReply` streaming the specified fragments.
    #[inline]
    pub fn with_fragments(fragments: impl Into<Vec<String>>) -> Self {
        Self {
            fragments: fragments.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serialize_deserialize() {
        let reply = PresetReply::with_fragments([
            "Hello, ".to_string(),
            "world!".to_string(),
        ]);

        let serialized = serde_json::to_string(&reply).unwrap();
        let deserialized: PresetReply =
            serde_json::from_str(&serialized).unwrap();

        assert_eq!(reply, deserialized);
    }
}
