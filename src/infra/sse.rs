//! Server-sent-events framing.
//!
//! Splits a byte stream into frames: `field: value` lines accumulate into the
//! pending frame and a blank line dispatches it. Lines starting with `:` are
//! comments. A frame still pending at EOF is dropped, as the event-stream
//! format requires.

use std::io::{self, BufRead};

/// One dispatched event-stream frame.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SseFrame {
    /// `event:` field, if the server named the event
    pub event: Option<String>,
    /// `data:` lines joined with `\n`
    pub data: String,
    /// `id:` field
    pub id: Option<String>,
}

impl SseFrame {
    /// Unnamed frames and frames named `message` are the ones a browser
    /// delivers to `onmessage`; everything else is for named listeners.
    pub fn is_message(&self) -> bool {
        matches!(self.event.as_deref(), None | Some("message"))
    }
}

/// Reads frames off a buffered reader.
///
/// Lines are decoded lossily: invalid UTF-8 becomes U+FFFD and the
/// frame carrying it is left for the payload decoder to reject.
pub struct SseReader<R> {
    reader: R,
    buf: Vec<u8>,
}

impl<R: BufRead> SseReader<R> {
    pub fn new(reader: R) -> Self {
        Self { reader, buf: Vec::new() }
    }

    /// Read until the next dispatched frame. `Ok(None)` at EOF.
    pub fn next_frame(&mut self) -> io::Result<Option<SseFrame>> {
        let mut frame = SseFrame::default();
        let mut has_data = false;

        loop {
            self.buf.clear();
            if self.reader.read_until(b'\n', &mut self.buf)? == 0 {
                return Ok(None);
            }

            let decoded = String::from_utf8_lossy(&self.buf);
            let line = decoded.trim_end_matches(['\n', '\r']);
            if line.is_empty() {
                if has_data {
                    return Ok(Some(frame));
                }
                // Blank line with no data resets the pending fields
                frame = SseFrame::default();
                continue;
            }
            if line.starts_with(':') {
                continue;
            }

            let (field, value) = match line.split_once(':') {
                Some((field, value)) => (field, value.strip_prefix(' ').unwrap_or(value)),
                None => (line, ""),
            };

            match field {
                "data" => {
                    if has_data {
                        frame.data.push('\n');
                    }
                    frame.data.push_str(value);
                    has_data = true;
                }
                "event" => frame.event = Some(value.to_string()),
                "id" => frame.id = Some(value.to_string()),
                // `retry` only matters for automatic reconnects, which we don't do
                _ => {}
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frames(input: &str) -> Vec<SseFrame> {
        frames_from_bytes(input.as_bytes())
    }

    fn frames_from_bytes(input: &[u8]) -> Vec<SseFrame> {
        let mut reader = SseReader::new(input);
        let mut out = Vec::new();
        while let Some(frame) = reader.next_frame().unwrap() {
            out.push(frame);
        }
        out
    }

    #[test]
    fn single_data_frame() {
        let out = frames("data: {\"type\":\"end\"}\n\n");
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].data, "{\"type\":\"end\"}");
        assert!(out[0].is_message());
    }

    #[test]
    fn multiline_data_is_joined_with_newline() {
        let out = frames("data: first\ndata: second\n\n");
        assert_eq!(out[0].data, "first\nsecond");
    }

    #[test]
    fn comments_and_crlf() {
        let out = frames(": keep-alive\r\ndata: a\r\n\r\n: ping\r\n\r\ndata: b\r\n\r\n");
        let data: Vec<_> = out.iter().map(|f| f.data.as_str()).collect();
        assert_eq!(data, vec!["a", "b"]);
    }

    #[test]
    fn value_without_space_after_colon() {
        let out = frames("data:tight\n\n");
        assert_eq!(out[0].data, "tight");
    }

    #[test]
    fn named_events_and_ids() {
        let out = frames("event: ping\nid: 7\ndata: x\n\nevent: message\ndata: y\n\n");
        assert_eq!(out[0].event.as_deref(), Some("ping"));
        assert_eq!(out[0].id.as_deref(), Some("7"));
        assert!(!out[0].is_message());
        assert!(out[1].is_message());
    }

    #[test]
    fn truncated_trailing_frame_is_dropped() {
        let out = frames("data: complete\n\ndata: partial");
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].data, "complete");
    }

    #[test]
    fn blank_lines_without_data_dispatch_nothing() {
        let out = frames("\n\nevent: lonely\n\ndata: z\n\n");
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].event, None);
        assert_eq!(out[0].data, "z");
    }

    #[test]
    fn invalid_utf8_is_replaced_and_reading_continues() {
        let out = frames_from_bytes(b"data: bad\xff\n\ndata: good\n\n");
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].data, "bad\u{FFFD}");
        assert_eq!(out[1].data, "good");
    }
}
