//! HTTP transport for answer streams.
//!
//! Each opened stream gets its own reader thread that decodes frames and
//! forwards them over the shared channel, tagged with the stream id.

use std::io::BufReader;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::Sender;
use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::header::{ACCEPT, CACHE_CONTROL, CONTENT_TYPE};
use tracing::{debug, info, trace, warn};

use super::error::StreamError;
use super::protocol::{DecodeError, ServerEvent, decode_event};
use super::sse::SseReader;
use crate::config::AppConfig;
use crate::constants::MAX_ERROR_BODY_CHARS;

pub type StreamId = u64;

/// What one query asks the server for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamRequest {
    pub query: String,
    pub checkpoint: Option<String>,
}

/// Events emitted by a stream's reader thread
#[derive(Debug)]
pub enum StreamEvent {
    /// A well-formed message
    Event(ServerEvent),
    /// A frame whose payload could not be decoded; the stream goes on
    Malformed { data: String, error: DecodeError },
    /// The stream is over and the connection is gone
    Failed(StreamError),
}

#[derive(Debug)]
pub struct StreamMessage {
    pub stream_id: StreamId,
    pub event: StreamEvent,
}

/// Reader-side view of a handle's cancel flag.
#[derive(Debug, Clone)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// Owner-side handle of one live stream. Dropping it closes the stream.
#[derive(Debug)]
pub struct StreamHandle {
    id: StreamId,
    cancel: Arc<AtomicBool>,
}

impl StreamHandle {
    pub fn new(id: StreamId) -> Self {
        Self { id, cancel: Arc::new(AtomicBool::new(false)) }
    }

    pub fn id(&self) -> StreamId {
        self.id
    }

    pub fn token(&self) -> CancelToken {
        CancelToken(Arc::clone(&self.cancel))
    }

    /// Best-effort close: the reader stops at the next frame boundary.
    pub fn close(&self) {
        self.cancel.store(true, Ordering::Release);
    }
}

impl Drop for StreamHandle {
    fn drop(&mut self) {
        self.close();
    }
}

/// Opens answer streams. The controller only talks to this seam.
pub trait Transport {
    fn open(&self, id: StreamId, request: &StreamRequest, tx: Sender<StreamMessage>) -> StreamHandle;
}

/// `GET <base>/<query>[?checkpoint_id=<token>]` over a blocking reqwest client.
pub struct HttpTransport {
    client: Client,
    base_url: String,
}

impl HttpTransport {
    pub fn new(config: &AppConfig) -> Result<Self, reqwest::Error> {
        // No overall timeout: the body is a long-lived stream
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .timeout(None::<Duration>)
            .build()?;
        Ok(Self { client, base_url: config.base_url.clone() })
    }
}

impl Transport for HttpTransport {
    fn open(&self, id: StreamId, request: &StreamRequest, tx: Sender<StreamMessage>) -> StreamHandle {
        let url = build_url(&self.base_url, request);
        let handle = StreamHandle::new(id);
        let cancel = handle.token();
        let client = self.client.clone();

        info!(stream_id = id, %url, "opening answer stream");
        std::thread::spawn(move || {
            match pump(&client, &url, id, &cancel, &tx) {
                Ok(()) => debug!(stream_id = id, "stream reader finished"),
                Err(e) if cancel.is_cancelled() => debug!(stream_id = id, error = %e, "closed stream errored"),
                Err(e) => {
                    warn!(stream_id = id, error = %e, "answer stream failed");
                    let _ = tx.send(StreamMessage { stream_id: id, event: StreamEvent::Failed(e) });
                }
            }
        });
        handle
    }
}

/// Build the request URL for a query. Query and checkpoint are percent-encoded.
pub fn build_url(base_url: &str, request: &StreamRequest) -> String {
    let mut url = format!("{}/{}", base_url.trim_end_matches('/'), urlencoding::encode(&request.query));
    if let Some(checkpoint) = &request.checkpoint {
        url.push_str("?checkpoint_id=");
        url.push_str(&urlencoding::encode(checkpoint));
    }
    url
}

/// Read one stream to completion. Returning drops the response, which
/// releases the connection.
fn pump(
    client: &Client,
    url: &str,
    id: StreamId,
    cancel: &CancelToken,
    tx: &Sender<StreamMessage>,
) -> Result<(), StreamError> {
    let response = client.get(url).header(ACCEPT, "text/event-stream").header(CACHE_CONTROL, "no-cache").send()?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().unwrap_or_default();
        return Err(StreamError::Status { status: status.as_u16(), body: truncate(&body, MAX_ERROR_BODY_CHARS) });
    }

    let content_type =
        response.headers().get(CONTENT_TYPE).and_then(|v| v.to_str().ok()).unwrap_or("(none)").to_string();
    if !content_type.starts_with("text/event-stream") {
        return Err(StreamError::ContentType(content_type));
    }

    let mut frames = SseReader::new(BufReader::new(response));
    while let Some(frame) = frames.next_frame()? {
        if cancel.is_cancelled() {
            debug!(stream_id = id, "stream closed by owner");
            return Ok(());
        }
        if !frame.is_message() {
            debug!(stream_id = id, event = ?frame.event, frame_id = ?frame.id, "skipping named event");
            continue;
        }
        trace!(stream_id = id, frame_id = ?frame.id, bytes = frame.data.len(), "frame received");

        let event = match decode_event(&frame.data) {
            Ok(ev) => StreamEvent::Event(ev),
            Err(error) => StreamEvent::Malformed { data: frame.data, error },
        };
        let is_end = matches!(event, StreamEvent::Event(ServerEvent::End));

        if tx.send(StreamMessage { stream_id: id, event }).is_err() {
            // Receiver is gone, nobody is listening
            return Ok(());
        }
        if is_end {
            return Ok(());
        }
    }

    if cancel.is_cancelled() { Ok(()) } else { Err(StreamError::Closed) }
}

fn truncate(s: &str, max_chars: usize) -> String {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}…", &s[..idx]),
        None => s.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{BufRead, Write};
    use std::net::TcpListener;
    use std::sync::mpsc;
    use std::thread::JoinHandle;

    /// Serve one canned HTTP response; the join handle yields the request line.
    fn serve_once(status_line: &str, content_type: &str, body: impl AsRef<[u8]>) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let mut response =
            format!("HTTP/1.1 {}\r\nContent-Type: {}\r\nConnection: close\r\n\r\n", status_line, content_type)
                .into_bytes();
        response.extend_from_slice(body.as_ref());
        let handle = std::thread::spawn(move || {
            let (stream, _) = listener.accept().unwrap();
            let mut reader = std::io::BufReader::new(stream);
            let mut request_line = String::new();
            reader.read_line(&mut request_line).unwrap();
            let mut line = String::new();
            loop {
                line.clear();
                reader.read_line(&mut line).unwrap();
                if line == "\r\n" || line.is_empty() {
                    break;
                }
            }
            let mut stream = reader.into_inner();
            stream.write_all(&response).unwrap();
            stream.flush().unwrap();
            request_line.trim_end().to_string()
        });
        (format!("http://{}/chat_stream/", addr), handle)
    }

    fn transport(base_url: String) -> HttpTransport {
        let config = AppConfig { base_url, ..AppConfig::default() };
        HttpTransport::new(&config).unwrap()
    }

    /// Collect messages until the stream reports end or failure.
    fn collect(rx: &mpsc::Receiver<StreamMessage>) -> Vec<StreamEvent> {
        let mut out = Vec::new();
        while let Ok(msg) = rx.recv_timeout(Duration::from_secs(5)) {
            assert_eq!(msg.stream_id, 9);
            let done = matches!(msg.event, StreamEvent::Event(ServerEvent::End) | StreamEvent::Failed(_));
            out.push(msg.event);
            if done {
                break;
            }
        }
        out
    }

    #[test]
    fn url_without_checkpoint() {
        let req = StreamRequest { query: "what is rust?".into(), checkpoint: None };
        assert_eq!(build_url("http://h:8000/chat_stream/", &req), "http://h:8000/chat_stream/what%20is%20rust%3F");
    }

    #[test]
    fn url_with_checkpoint() {
        let req = StreamRequest { query: "a&b".into(), checkpoint: Some("cp/1".into()) };
        assert_eq!(build_url("http://h/chat_stream", &req), "http://h/chat_stream/a%26b?checkpoint_id=cp%2F1");
    }

    #[test]
    fn handle_drop_closes() {
        let handle = StreamHandle::new(1);
        let token = handle.token();
        assert!(!token.is_cancelled());
        drop(handle);
        assert!(token.is_cancelled());
    }

    #[test]
    fn streams_decoded_events_until_end() {
        let body = concat!(
            ": hello\n\n",
            "data: {\"type\":\"checkpoint\",\"checkpoint_id\":\"cp-2\"}\n\n",
            "data: {\"type\":\"search_start\",\"query\":\"rust\"}\n\n",
            "data: not json\n\n",
            "event: ping\ndata: {\"type\":\"content\",\"content\":\"hidden\"}\n\n",
            "data: {\"type\":\"content\",\"content\":\"Hi\"}\n\n",
            "data: {\"type\":\"end\"}\n\n",
            "data: {\"type\":\"content\",\"content\":\"after end\"}\n\n",
        );
        let (base, server) = serve_once("200 OK", "text/event-stream", body);
        let (tx, rx) = mpsc::channel();
        let req = StreamRequest { query: "what is rust".into(), checkpoint: Some("cp-1".into()) };
        let _handle = transport(base).open(9, &req, tx);

        let events = collect(&rx);
        assert_eq!(events.len(), 5);
        assert!(matches!(&events[0], StreamEvent::Event(ServerEvent::Checkpoint { checkpoint_id }) if checkpoint_id == "cp-2"));
        assert!(matches!(&events[1], StreamEvent::Event(ServerEvent::SearchStart { query }) if query == "rust"));
        assert!(matches!(&events[2], StreamEvent::Malformed { data, .. } if data == "not json"));
        assert!(matches!(&events[3], StreamEvent::Event(ServerEvent::Content { content }) if content == "Hi"));
        assert!(matches!(&events[4], StreamEvent::Event(ServerEvent::End)));

        let request_line = server.join().unwrap();
        assert_eq!(request_line, "GET /chat_stream/what%20is%20rust?checkpoint_id=cp-1 HTTP/1.1");
    }

    #[test]
    fn non_success_status_fails() {
        let (base, server) = serve_once("500 Internal Server Error", "text/plain", "boom");
        let (tx, rx) = mpsc::channel();
        let req = StreamRequest { query: "q".into(), checkpoint: None };
        let _handle = transport(base).open(9, &req, tx);

        let events = collect(&rx);
        assert_eq!(events.len(), 1);
        match &events[0] {
            StreamEvent::Failed(StreamError::Status { status, body }) => {
                assert_eq!(*status, 500);
                assert_eq!(body, "boom");
            }
            other => panic!("unexpected event: {other:?}"),
        }
        server.join().unwrap();
    }

    #[test]
    fn wrong_content_type_fails() {
        let (base, server) = serve_once("200 OK", "text/html", "<html></html>");
        let (tx, rx) = mpsc::channel();
        let req = StreamRequest { query: "q".into(), checkpoint: None };
        let _handle = transport(base).open(9, &req, tx);

        let events = collect(&rx);
        assert!(matches!(&events[..], [StreamEvent::Failed(StreamError::ContentType(ct))] if ct == "text/html"));
        server.join().unwrap();
    }

    #[test]
    fn eof_before_end_fails_after_partial_content() {
        let body = "data: {\"type\":\"content\",\"content\":\"partial\"}\n\n";
        let (base, server) = serve_once("200 OK", "text/event-stream", body);
        let (tx, rx) = mpsc::channel();
        let req = StreamRequest { query: "q".into(), checkpoint: None };
        let _handle = transport(base).open(9, &req, tx);

        let events = collect(&rx);
        assert_eq!(events.len(), 2);
        assert!(matches!(&events[0], StreamEvent::Event(ServerEvent::Content { content }) if content == "partial"));
        assert!(matches!(&events[1], StreamEvent::Failed(StreamError::Closed)));
        server.join().unwrap();
    }

    #[test]
    fn invalid_utf8_frame_does_not_end_the_stream() {
        let mut body = b"data: {\"type\":\"content\",\"content\":\"bad\xff\"}\n\n".to_vec();
        body.extend_from_slice(b"data: {\"type\":\"content\",\"content\":\"good\"}\n\n");
        body.extend_from_slice(b"data: {\"type\":\"end\"}\n\n");
        let (base, server) = serve_once("200 OK", "text/event-stream", body);
        let (tx, rx) = mpsc::channel();
        let req = StreamRequest { query: "q".into(), checkpoint: None };
        let _handle = transport(base).open(9, &req, tx);

        let events = collect(&rx);
        assert_eq!(events.len(), 3);
        assert!(matches!(&events[0], StreamEvent::Event(ServerEvent::Content { content }) if content == "bad\u{FFFD}"));
        assert!(matches!(&events[1], StreamEvent::Event(ServerEvent::Content { content }) if content == "good"));
        assert!(matches!(&events[2], StreamEvent::Event(ServerEvent::End)));
        server.join().unwrap();
    }

    #[test]
    fn truncate_long_bodies() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("ééééé", 2), "éé…");
    }
}
