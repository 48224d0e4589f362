//! One-shot mode: run a single query and print its stages and answer as
//! plain text.

use std::io::{self, Write};
use std::sync::mpsc::Receiver;

use thiserror::Error;

use super::controller::QueryError;
use super::shell::ChatShell;
use crate::infra::client::StreamMessage;
use crate::state::{Stage, StreamStatus};
use crate::ui::stage::source_label;

#[derive(Debug, Error)]
pub enum HeadlessError {
    #[error(transparent)]
    Query(#[from] QueryError),
    #[error("write failed: {0}")]
    Io(#[from] io::Error),
}

pub fn run_once(
    shell: &mut ChatShell,
    rx: &Receiver<StreamMessage>,
    query: &str,
    out: &mut impl Write,
) -> Result<StreamStatus, HeadlessError> {
    shell.submit(query)?;

    let mut stage = Stage::None;
    let mut printed = 0;

    while shell.stream().in_progress() {
        let Ok(msg) = rx.recv() else { break };
        if !shell.handle_message(msg) {
            continue;
        }
        let stream = shell.stream();

        if stream.stage != stage {
            match stream.stage {
                Stage::Searching => writeln!(out, "Searching the web: {}", stream.search_query)?,
                Stage::Reading => {
                    let hosts: Vec<&str> = stream.sources.iter().map(|url| source_label(url)).collect();
                    writeln!(out, "Reading: {}", hosts.join(", "))?;
                }
                Stage::Writing => writeln!(out)?,
                Stage::None => {}
            }
            stage = stream.stage;
        }

        if stream.answer.len() > printed {
            write!(out, "{}", &stream.answer[printed..])?;
            printed = stream.answer.len();
            out.flush()?;
        }
    }

    if printed > 0 {
        writeln!(out)?;
    }
    Ok(shell.stream().status.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc::{self, Sender};

    use crate::app::controller::StreamController;
    use crate::infra::client::{StreamEvent, StreamHandle, StreamId, StreamRequest, Transport};
    use crate::infra::error::StreamError;
    use crate::infra::protocol::decode_event;

    /// Delivers a fixed script the moment a stream opens.
    struct CannedTransport {
        frames: Vec<&'static str>,
        fail_at_end: bool,
    }

    impl Transport for CannedTransport {
        fn open(&self, id: StreamId, _request: &StreamRequest, tx: Sender<StreamMessage>) -> StreamHandle {
            for json in &self.frames {
                let event = StreamEvent::Event(decode_event(json).unwrap());
                tx.send(StreamMessage { stream_id: id, event }).unwrap();
            }
            if self.fail_at_end {
                tx.send(StreamMessage { stream_id: id, event: StreamEvent::Failed(StreamError::Closed) }).unwrap();
            }
            StreamHandle::new(id)
        }
    }

    fn shell(frames: Vec<&'static str>, fail_at_end: bool) -> (ChatShell, Receiver<StreamMessage>) {
        let (tx, rx) = mpsc::channel();
        let controller = StreamController::new(Box::new(CannedTransport { frames, fail_at_end }), tx);
        (ChatShell::new(controller), rx)
    }

    #[test]
    fn prints_stages_then_answer() {
        let (mut shell, rx) = shell(
            vec![
                r#"{"type":"checkpoint","checkpoint_id":"c1"}"#,
                r#"{"type":"search_start","query":"rust sse"}"#,
                r#"{"type":"search_results","urls":["https://docs.rs/x","http://blog.example.com/post"]}"#,
                r#"{"type":"content","content":"Use "}"#,
                r#"{"type":"content","content":"reqwest."}"#,
                r#"{"type":"end"}"#,
            ],
            false,
        );
        let mut out = Vec::new();
        let status = run_once(&mut shell, &rx, "rust sse", &mut out).unwrap();

        assert_eq!(status, StreamStatus::Done);
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "Searching the web: rust sse\nReading: docs.rs, blog.example.com\n\nUse reqwest.\n"
        );
    }

    #[test]
    fn reports_failure_after_partial_answer() {
        let (mut shell, rx) = shell(vec![r#"{"type":"content","content":"half"}"#], true);
        let mut out = Vec::new();
        let status = run_once(&mut shell, &rx, "q", &mut out).unwrap();

        assert_eq!(status, StreamStatus::Failed("stream closed before end".into()));
        assert_eq!(String::from_utf8(out).unwrap(), "\nhalf\n");
    }

    #[test]
    fn blank_query_is_an_error() {
        let (mut shell, rx) = shell(vec![], false);
        let err = run_once(&mut shell, &rx, "  ", &mut Vec::new()).unwrap_err();
        assert!(matches!(err, HeadlessError::Query(QueryError::Blank)));
    }
}
