use tracing::info;

use super::controller::{QueryError, StreamController};
use crate::infra::client::{StreamId, StreamMessage};
use crate::state::{Session, StreamState};

/// Current conversation plus its stream controller.
pub struct ChatShell {
    session: Session,
    controller: StreamController,
}

impl ChatShell {
    pub fn new(controller: StreamController) -> Self {
        Self { session: Session::initial(), controller }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn stream(&self) -> &StreamState {
        self.controller.state()
    }

    pub fn submit(&mut self, query: &str) -> Result<StreamId, QueryError> {
        self.controller.submit(query)
    }

    pub fn handle_message(&mut self, msg: StreamMessage) -> bool {
        self.controller.handle_message(msg)
    }

    pub fn stop(&mut self) -> bool {
        self.controller.stop()
    }

    /// Replace the session and wipe the controller, checkpoint included.
    pub fn new_session(&mut self) {
        let previous = std::mem::replace(&mut self.session, Session::fresh());
        self.controller.reset();
        info!(previous = previous.id(), session = self.session.id(), "started new session");
    }

    /// Close whatever is live before exit.
    pub fn shutdown(&mut self) {
        self.controller.stop();
    }
}
