use tracing::{debug, trace};

use crate::infra::protocol::ServerEvent;

/// Phase of answer generation shown to the user.
///
/// Ordered: within one query the stage only moves forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum Stage {
    #[default]
    None,
    Searching,
    Reading,
    Writing,
}

/// Lifecycle of the current query's stream.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum StreamStatus {
    #[default]
    Idle,
    Streaming,
    Done,
    Failed(String),
    Stopped,
}

/// Everything the stage panel is drawn from, plus the checkpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StreamState {
    pub stage: Stage,
    /// Query text echoed back by `search_start`
    pub search_query: String,
    /// Source URLs from the latest `search_results`
    pub sources: Vec<String>,
    pub answer: String,
    pub status: StreamStatus,
    /// Resumption token, kept across queries within one session
    pub checkpoint: Option<String>,
}

impl StreamState {
    pub fn in_progress(&self) -> bool {
        self.status == StreamStatus::Streaming
    }

    /// Start of a new query: response fields cleared, checkpoint kept.
    pub fn begin_query(&mut self) {
        self.clear_response();
        self.status = StreamStatus::Streaming;
    }

    /// Session change: everything goes, checkpoint included.
    pub fn reset(&mut self) {
        self.clear_response();
        self.checkpoint = None;
        self.status = StreamStatus::Idle;
    }

    // Stage, query, sources and answer are only ever cleared together
    fn clear_response(&mut self) {
        self.stage = Stage::None;
        self.search_query.clear();
        self.sources.clear();
        self.answer.clear();
    }

    /// Apply one server event. Returns true when the event ends the stream.
    ///
    /// Events arriving after the stream left `Streaming` are dropped.
    pub fn apply(&mut self, event: ServerEvent) -> bool {
        if !self.in_progress() {
            debug!(kind = event.kind(), status = ?self.status, "event after stream finished, dropped");
            return false;
        }

        match event {
            ServerEvent::Checkpoint { checkpoint_id } => {
                self.checkpoint = Some(checkpoint_id);
            }
            ServerEvent::SearchStart { query } => {
                self.search_query = query;
                self.advance(Stage::Searching);
            }
            ServerEvent::SearchResults { urls } => {
                self.sources = urls;
                // No sources, nothing to read
                if !self.sources.is_empty() {
                    self.advance(Stage::Reading);
                }
            }
            ServerEvent::Content { content } => {
                self.advance(Stage::Writing);
                self.answer.push_str(&content);
            }
            ServerEvent::End => {
                self.status = StreamStatus::Done;
                return true;
            }
            ServerEvent::Unrecognized(_) => {}
        }
        false
    }

    /// Transport failure. Partial content stays.
    pub fn fail(&mut self, message: String) {
        if self.in_progress() {
            self.status = StreamStatus::Failed(message);
        }
    }

    /// Caller closed the stream. Partial content stays.
    pub fn stop(&mut self) {
        if self.in_progress() {
            self.status = StreamStatus::Stopped;
        }
    }

    fn advance(&mut self, next: Stage) {
        if next > self.stage {
            self.stage = next;
        } else if next < self.stage {
            trace!(current = ?self.stage, requested = ?next, "ignoring backward stage change");
        }
    }
}
