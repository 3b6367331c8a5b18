use std::fmt::{self, Display};

#[cfg(test)]
use std::collections::VecDeque;

use bytes::Bytes;
use reqwest::Response;

/// The connection dropped while the body was still streaming.
#[derive(Debug, PartialEq, Eq)]
pub struct TransportError(pub(crate) String);

impl Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A source of raw body bytes.
pub enum ByteSource {
    Response(Response),
    #[cfg(test)]
    Scripted(VecDeque<Bytes>),
    #[cfg(test)]
    Broken(VecDeque<Bytes>),
}

impl ByteSource {
    pub fn from_response(response: Response) -> Self {
        ByteSource::Response(response)
    }

    #[cfg(test)]
    pub fn scripted(chunks: impl Into<VecDeque<Bytes>>) -> Self {
        ByteSource::Scripted(chunks.into())
    }

    /// A scripted source that drops the connection once drained.
    #[cfg(test)]
    pub fn broken(chunks: impl Into<VecDeque<Bytes>>) -> Self {
        ByteSource::Broken(chunks.into())
    }

    #[inline]
    async fn next_chunk(&mut self) -> Result<Option<Bytes>, TransportError> {
        match self {
            ByteSource::Response(response) => response
                .chunk()
                .await
                .map_err(|err| TransportError(err.to_string())),
            #[cfg(test)]
            ByteSource::Scripted(chunks) => Ok(chunks.pop_front()),
            #[cfg(test)]
            ByteSource::Broken(chunks) => chunks
                .pop_front()
                .map(Some)
                .ok_or_else(|| TransportError("connection reset".to_owned())),
        }
    }
}

/// Splits a chunked byte stream into text lines.
///
/// Lines are terminated by a line feed; a trailing carriage return is
/// stripped. The final unterminated line, if any, is flushed when the
/// source ends. Bytes are converted to text only once a complete line
/// is available, so a multi-byte character split across two chunks
/// stays intact.
pub struct Lines {
    buf: Vec<u8>,
    source: ByteSource,
    eof: bool,
}

impl Lines {
    #[inline]
    pub fn new(source: ByteSource) -> Self {
        Self {
            buf: Vec::new(),
            source,
            eof: false,
        }
    }

    pub async fn next_line(
        &mut self,
    ) -> Result<Option<String>, TransportError> {
        loop {
            if let Some(idx) = self.buf.iter().position(|&b| b == b'\n') {
                let rest = self.buf.split_off(idx + 1);
                let mut line = std::mem::replace(&mut self.buf, rest);
                line.pop();
                if line.last() == Some(&b'\r') {
                    line.pop();
                }
                return Ok(Some(String::from_utf8_lossy(&line).into_owned()));
            }

            if self.eof {
                if self.buf.is_empty() {
                    return Ok(None);
                }
                let line = std::mem::take(&mut self.buf);
                return Ok(Some(String::from_utf8_lossy(&line).into_owned()));
            }

            match self.source.next_chunk().await? {
                Some(bytes) => self.buf.extend_from_slice(&bytes),
                None => self.eof = true,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn collect(mut lines: Lines) -> Vec<String> {
        let mut out = Vec::new();
        while let Some(line) = lines.next_line().await.unwrap() {
            out.push(line);
        }
        out
    }

    #[tokio::test]
    async fn test_lines_across_chunks() {
        let lines = Lines::new(ByteSource::scripted([
            Bytes::from_static(b"first li"),
            Bytes::from_static(b"ne\nsecond"),
            Bytes::from_static(b" line\nthird"),
        ]));
        assert_eq!(
            collect(lines).await,
            vec!["first line", "second line", "third"]
        );
    }

    #[tokio::test]
    async fn test_crlf_terminators() {
        let lines = Lines::new(ByteSource::scripted([Bytes::from_static(
            b"one\r\ntwo\r\n\r\n",
        )]));
        assert_eq!(collect(lines).await, vec!["one", "two", ""]);
    }

    #[tokio::test]
    async fn test_multibyte_split_across_chunks() {
        // "héllo" with the two-byte é split between chunks.
        let lines = Lines::new(ByteSource::scripted([
            Bytes::from_static(&[b'h', 0xc3]),
            Bytes::from_static(&[0xa9, b'l', b'l', b'o', b'\n']),
        ]));
        assert_eq!(collect(lines).await, vec!["héllo"]);
    }

    #[tokio::test]
    async fn test_empty_source() {
        let mut lines = Lines::new(ByteSource::scripted([]));
        assert_eq!(lines.next_line().await.unwrap(), None);
        assert_eq!(lines.next_line().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_broken_source() {
        let mut lines = Lines::new(ByteSource::broken([Bytes::from_static(
            b"only line\n",
        )]));
        assert_eq!(
            lines.next_line().await.unwrap(),
            Some("only line".to_owned())
        );
        let err = lines.next_line().await.unwrap_err();
        assert_eq!(err, TransportError("connection reset".to_owned()));
    }
}
