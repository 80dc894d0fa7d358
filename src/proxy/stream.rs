//! SSE delta decoding and plain-text relay of upstream streams.
//!
//! [`DeltaDecoder`] line-buffers raw upstream bytes, reassembles complete
//! SSE lines across TCP chunk boundaries, and extracts the text delta of
//! each `data:` event. [`relay_text_stream`] drives it over a live byte
//! stream and yields only the text fragments, ready to be used as an HTTP body.

use bytes::Bytes;
use futures::{Stream, StreamExt};

use super::types::ChatCompletionChunk;

/// Cap on a single SSE line, terminated or not. Upstream lines never get close.
const MAX_LINE_BYTES: usize = 64 * 1024;

/// Failures that end a relay stream after the response has started.
#[derive(Debug, thiserror::Error)]
pub enum StreamError {
    #[error("upstream stream failed: {0}")]
    Transport(String),

    #[error("upstream reported an error mid-stream: {0}")]
    Upstream(String),

    #[error("SSE line exceeded 64 KiB")]
    LineTooLong,
}

impl From<StreamError> for std::io::Error {
    fn from(err: StreamError) -> Self {
        std::io::Error::other(err)
    }
}

/// Incremental decoder for an OpenAI-compatible SSE stream.
pub struct DeltaDecoder {
    buffer: Vec<u8>,
    done: bool,
}

impl Default for DeltaDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl DeltaDecoder {
    pub fn new() -> Self {
        Self {
            buffer: Vec::new(),
            done: false,
        }
    }

    /// Whether `data: [DONE]` has been seen.
    pub fn is_done(&self) -> bool {
        self.done
    }

    /// Feed a chunk of bytes; returns the text deltas completed by it, in order.
    pub fn push(&mut self, bytes: &[u8]) -> Result<Vec<String>, StreamError> {
        let mut out = Vec::new();
        if self.done {
            return Ok(out);
        }

        self.buffer.extend_from_slice(bytes);

        while let Some(end) = self.next_line_end() {
            let line: Vec<u8> = self.buffer.drain(..end).collect();
            if line.len() > MAX_LINE_BYTES {
                self.buffer.clear();
                return Err(StreamError::LineTooLong);
            }
            self.process_line(&line, &mut out)?;
            if self.done {
                self.buffer.clear();
                return Ok(out);
            }
        }

        if self.buffer.len() > MAX_LINE_BYTES {
            self.buffer.clear();
            return Err(StreamError::LineTooLong);
        }

        Ok(out)
    }

    /// Length of the next complete line in the buffer, terminator included.
    ///
    /// `\n`, `\r\n` and a bare `\r` all end a line. A `\r` that is the last
    /// buffered byte is held until the next chunk shows whether `\n` follows.
    fn next_line_end(&self) -> Option<usize> {
        let pos = self
            .buffer
            .iter()
            .position(|&b| b == b'\n' || b == b'\r')?;
        if self.buffer[pos] == b'\n' {
            return Some(pos + 1);
        }
        match self.buffer.get(pos + 1) {
            Some(b'\n') => Some(pos + 2),
            Some(_) => Some(pos + 1),
            None => None,
        }
    }

    /// Flush a trailing line that arrived without a terminator.
    pub fn finish(&mut self) -> Result<Vec<String>, StreamError> {
        let mut out = Vec::new();
        if !self.done && !self.buffer.is_empty() {
            let line = std::mem::take(&mut self.buffer);
            self.process_line(&line, &mut out)?;
        }
        Ok(out)
    }

    fn process_line(&mut self, raw: &[u8], out: &mut Vec<String>) -> Result<(), StreamError> {
        let line = String::from_utf8_lossy(raw);
        let line = line.trim_end_matches(['\n', '\r']);

        // event:, id:, retry: and comments carry nothing we relay
        let Some(data) = line.strip_prefix("data:") else {
            return Ok(());
        };
        let data = data.trim_start();

        if data == "[DONE]" {
            self.done = true;
            return Ok(());
        }
        if data.is_empty() {
            return Ok(());
        }

        let value: serde_json::Value = match serde_json::from_str(data) {
            Ok(v) => v,
            Err(e) => {
                tracing::debug!(error = %e, "Skipping malformed SSE data line");
                return Ok(());
            }
        };

        if let Some(err) = value.get("error").filter(|e| !e.is_null()) {
            return Err(StreamError::Upstream(err.to_string()));
        }

        match serde_json::from_value::<ChatCompletionChunk>(value) {
            Ok(chunk) => {
                if let Some(text) = chunk.into_content() {
                    out.push(text);
                }
            }
            Err(e) => tracing::debug!(error = %e, "Skipping unrecognised SSE chunk"),
        }

        Ok(())
    }
}

/// Turn an upstream SSE byte stream into a stream of plain-text fragments.
///
/// Each delta is yielded as soon as its line is complete. Any failure ends
/// the stream with an error, which aborts the client response body.
pub fn relay_text_stream<S, E>(upstream: S) -> impl Stream<Item = Result<Bytes, StreamError>>
where
    S: Stream<Item = Result<Bytes, E>> + Send + 'static,
    E: std::fmt::Display + Send + 'static,
{
    async_stream::try_stream! {
        let mut decoder = DeltaDecoder::new();
        let mut fragments = 0usize;
        futures::pin_mut!(upstream);

        while let Some(chunk) = upstream.next().await {
            let bytes = chunk.map_err(|e| StreamError::Transport(e.to_string()))?;
            for text in decoder.push(&bytes)? {
                fragments += 1;
                yield Bytes::from(text);
            }
            if decoder.is_done() {
                break;
            }
        }

        for text in decoder.finish()? {
            fragments += 1;
            yield Bytes::from(text);
        }

        tracing::debug!(fragments, done = decoder.is_done(), "Upstream stream finished");
    }
}
