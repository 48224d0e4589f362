//! Owns the single live answer stream and folds its messages into
//! [`StreamState`].

use std::sync::mpsc::Sender;

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::infra::client::{StreamEvent, StreamHandle, StreamId, StreamMessage, StreamRequest, Transport};
use crate::infra::protocol::ServerEvent;
use crate::state::StreamState;

/// Longest slice of a malformed payload that goes into the log
const MALFORMED_PREVIEW_CHARS: usize = 120;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum QueryError {
    #[error("query is empty")]
    Blank,
}

pub struct StreamController {
    state: StreamState,
    handle: Option<StreamHandle>,
    transport: Box<dyn Transport>,
    tx: Sender<StreamMessage>,
    next_id: StreamId,
}

impl StreamController {
    pub fn new(transport: Box<dyn Transport>, tx: Sender<StreamMessage>) -> Self {
        Self { state: StreamState::default(), handle: None, transport, tx, next_id: 1 }
    }

    pub fn state(&self) -> &StreamState {
        &self.state
    }

    /// Id of the stream whose messages are currently accepted.
    pub fn active_stream(&self) -> Option<StreamId> {
        self.handle.as_ref().map(StreamHandle::id)
    }

    /// Open a stream for `query`. Any live stream is closed first.
    ///
    /// Blank queries are rejected before anything changes.
    pub fn submit(&mut self, query: &str) -> Result<StreamId, QueryError> {
        if query.trim().is_empty() {
            return Err(QueryError::Blank);
        }

        self.release("replaced by a new query");
        self.state.begin_query();

        let id = self.next_id;
        self.next_id += 1;
        let request = StreamRequest { query: query.to_string(), checkpoint: self.state.checkpoint.clone() };
        info!(stream_id = id, resumed = request.checkpoint.is_some(), "submitting query");
        self.handle = Some(self.transport.open(id, &request, self.tx.clone()));
        Ok(id)
    }

    /// Fold one message into state. Returns true when anything visible changed.
    pub fn handle_message(&mut self, msg: StreamMessage) -> bool {
        if self.active_stream() != Some(msg.stream_id) {
            debug!(stream_id = msg.stream_id, "message from a closed stream, dropped");
            return false;
        }
        let stream_id = msg.stream_id;

        match msg.event {
            StreamEvent::Event(ServerEvent::Unrecognized(kind)) => {
                info!(stream_id, kind = %kind, "unrecognized event type ignored");
                false
            }
            StreamEvent::Event(event) => {
                if self.state.apply(event) {
                    info!(stream_id, answer_chars = self.state.answer.chars().count(), "stream complete");
                    self.release("end event");
                }
                true
            }
            StreamEvent::Malformed { data, error } => {
                let preview: String = data.chars().take(MALFORMED_PREVIEW_CHARS).collect();
                warn!(stream_id, %error, data = %preview, "malformed stream message dropped");
                false
            }
            StreamEvent::Failed(error) => {
                warn!(stream_id, %error, "stream failed");
                self.state.fail(error.to_string());
                self.release("transport error");
                true
            }
        }
    }

    /// Caller-initiated close. Returns false when nothing was live.
    pub fn stop(&mut self) -> bool {
        if self.handle.is_none() {
            return false;
        }
        self.release("stopped by user");
        self.state.stop();
        true
    }

    /// Close any stream and forget all stream-derived state, checkpoint included.
    pub fn reset(&mut self) {
        self.release("session reset");
        self.state.reset();
    }

    fn release(&mut self, reason: &str) {
        if let Some(handle) = self.handle.take() {
            handle.close();
            debug!(stream_id = handle.id(), reason, "stream released");
        }
    }
}
