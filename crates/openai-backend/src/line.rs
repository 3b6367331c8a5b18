use serde::Deserialize;

/// The framing prefix some servers put in front of each payload line.
const DATA_PREFIX: &str = "data: ";

#[derive(Debug, Deserialize)]
struct StreamChunk {
    #[serde(default)]
    choices: Vec<StreamChoice>,
    data: Option<NestedChunk>,
}

#[derive(Debug, Deserialize)]
struct NestedChunk {
    #[serde(default)]
    choices: Vec<StreamChoice>,
}

#[derive(Debug, Deserialize)]
struct StreamChoice {
    #[serde(default)]
    delta: StreamDelta,
}

#[derive(Debug, Default, Deserialize)]
struct StreamDelta {
    content: Option<String>,
}

/// Extracts the text fragment carried by one streamed protocol line.
///
/// The optional `data: ` framing prefix is stripped, the remainder is
/// decoded as JSON, and the first choice's `delta.content` is returned.
/// Some deployments wrap the whole chunk under a `data` key; that shape
/// wins when the key is present. Returns `None`, with a logged
/// diagnostic, for lines that decode to no fragment; never panics and
/// never aborts the stream.
pub fn parse_line(line: &str) -> Option<String> {
    let payload = line.strip_prefix(DATA_PREFIX).unwrap_or(line).trim();
    let chunk = match serde_json::from_str::<StreamChunk>(payload) {
        Ok(chunk) => chunk,
        Err(err) => {
            warn!("malformed stream line: {err}, raw: {line}");
            return None;
        }
    };
    let choices = match chunk.data {
        Some(nested) => nested.choices,
        None => chunk.choices,
    };
    choices.into_iter().next().and_then(|choice| choice.delta.content)
}
