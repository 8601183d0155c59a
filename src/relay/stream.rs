//! SSE token extraction module.
//!
//! Provides [`TokenExtractor`] for line-buffered extraction of content deltas
//! from OpenAI-compatible SSE streaming responses, and [`token_stream`] which
//! re-frames an upstream byte stream into a raw token stream for the client.
//! Handles TCP chunk boundary reassembly correctly: a `data:` line split
//! across two chunks is reassembled before parsing, so no token is lost.

use bytes::Bytes;
use futures::{Stream, StreamExt};

/// Cap on the line reassembly buffer. A line longer than this is dropped.
const MAX_LINE_BUFFER: usize = 64 * 1024;

/// Internal state for SSE line buffering and token extraction.
///
/// Buffers raw bytes across chunk boundaries, reassembles complete SSE lines,
/// and extracts `choices[0].delta.content` from `data:` lines.
#[derive(Debug, Default)]
pub struct TokenExtractor {
    buffer: Vec<u8>,
}

impl TokenExtractor {
    /// Create a new extractor with an empty buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Process a chunk of bytes from the SSE stream.
    ///
    /// Returns the concatenation of all content deltas completed by this
    /// chunk. May be empty when the chunk holds no complete `data:` line
    /// or only role/finish_reason bookkeeping.
    pub fn push(&mut self, bytes: &[u8]) -> String {
        self.buffer.extend_from_slice(bytes);

        let mut out = String::new();
        while let Some(pos) = self.buffer.iter().position(|&b| b == b'\n') {
            let line: Vec<u8> = self.buffer.drain(..=pos).collect();
            let line = String::from_utf8_lossy(&line);
            if let Some(token) = extract_token(line.trim_end_matches(['\r', '\n'])) {
                out.push_str(&token);
            }
        }

        if self.buffer.len() > MAX_LINE_BUFFER {
            tracing::warn!(
                len = self.buffer.len(),
                "SSE line exceeds buffer cap, dropping"
            );
            self.buffer.clear();
        }

        out
    }

    /// Flush any remaining unterminated line as a final line.
    ///
    /// Upstreams occasionally end the stream without a trailing newline
    /// after the last event.
    pub fn finish(&mut self) -> String {
        if self.buffer.is_empty() {
            return String::new();
        }
        let line = String::from_utf8_lossy(&self.buffer).to_string();
        self.buffer.clear();
        extract_token(line.trim_end_matches(['\r', '\n'])).unwrap_or_default()
    }
}

/// Extract the content delta from a single complete SSE line.
///
/// Returns `None` for non-`data:` fields (`event:`, `id:`, `retry:`,
/// comments), the `[DONE]` sentinel, malformed JSON, and chunks whose
/// delta carries no content (role announcements, finish_reason-only).
fn extract_token(line: &str) -> Option<String> {
    let data = line.strip_prefix("data:")?.trim_start();
    if data == "[DONE]" {
        return None;
    }
    let parsed: serde_json::Value = serde_json::from_str(data).ok()?;
    parsed
        .get("choices")?
        .get(0)?
        .get("delta")?
        .get("content")?
        .as_str()
        .map(|s| s.to_string())
}

/// Re-frame an upstream SSE byte stream into a raw token stream.
///
/// Each yielded item is the text extracted from the `data:` lines completed
/// by one upstream chunk; empty extractions are not yielded. An upstream
/// transport error is surfaced once and terminates the stream. When the
/// upstream ends, any unterminated final line is flushed.
pub fn token_stream<S>(upstream: S) -> impl Stream<Item = Result<Bytes, std::io::Error>>
where
    S: Stream<Item = reqwest::Result<Bytes>> + Send + 'static,
{
    let state = (Box::pin(upstream), TokenExtractor::new(), false);

    futures::stream::unfold(state, |(mut upstream, mut extractor, done)| async move {
        if done {
            return None;
        }
        loop {
            match upstream.next().await {
                Some(Ok(bytes)) => {
                    let out = extractor.push(&bytes);
                    if !out.is_empty() {
                        return Some((Ok(Bytes::from(out)), (upstream, extractor, false)));
                    }
                }
                Some(Err(e)) => {
                    tracing::error!(error = %e, "Error streaming from provider");
                    return Some((Err(std::io::Error::other(e)), (upstream, extractor, true)));
                }
                None => {
                    let tail = extractor.finish();
                    if !tail.is_empty() {
                        return Some((Ok(Bytes::from(tail)), (upstream, extractor, true)));
                    }
                    return None;
                }
            }
        }
    })
}
