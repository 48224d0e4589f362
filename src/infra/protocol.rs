//! Typed events carried in the `data` of each stream frame.

use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

/// One decoded message from the answer stream, tagged on `type`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServerEvent {
    /// Resumption token to send with the next query
    Checkpoint { checkpoint_id: String },
    /// Web search started (query may be server-normalized)
    SearchStart { query: String },
    /// Sources picked for reading
    SearchResults { urls: Vec<String> },
    /// Answer text fragment
    Content { content: String },
    /// Stream finished
    End,
    /// A `type` this client does not know
    Unrecognized(String),
}

impl ServerEvent {
    pub fn kind(&self) -> &str {
        match self {
            ServerEvent::Checkpoint { .. } => "checkpoint",
            ServerEvent::SearchStart { .. } => "search_start",
            ServerEvent::SearchResults { .. } => "search_results",
            ServerEvent::Content { .. } => "content",
            ServerEvent::End => "end",
            ServerEvent::Unrecognized(kind) => kind,
        }
    }
}

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("message has no string `type` field")]
    MissingType,
    #[error("bad fields for `{kind}`: {source}")]
    Fields {
        kind: String,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Deserialize)]
struct CheckpointFields {
    checkpoint_id: String,
}

#[derive(Deserialize)]
struct SearchStartFields {
    query: String,
}

#[derive(Deserialize)]
struct SearchResultsFields {
    urls: Vec<String>,
}

#[derive(Deserialize)]
struct ContentFields {
    content: String,
}

/// Decode one frame payload.
///
/// The tag is read first so that an unknown `type` is reported as
/// [`ServerEvent::Unrecognized`] rather than as a decode failure.
pub fn decode_event(data: &str) -> Result<ServerEvent, DecodeError> {
    let value: Value = serde_json::from_str(data)?;
    let kind = value.get("type").and_then(Value::as_str).ok_or(DecodeError::MissingType)?.to_string();

    let fields = |source: serde_json::Error| DecodeError::Fields { kind: kind.clone(), source };

    let event = match kind.as_str() {
        "checkpoint" => {
            let f: CheckpointFields = serde_json::from_value(value).map_err(fields)?;
            ServerEvent::Checkpoint { checkpoint_id: f.checkpoint_id }
        }
        "search_start" => {
            let f: SearchStartFields = serde_json::from_value(value).map_err(fields)?;
            ServerEvent::SearchStart { query: f.query }
        }
        "search_results" => {
            let f: SearchResultsFields = serde_json::from_value(value).map_err(fields)?;
            ServerEvent::SearchResults { urls: f.urls }
        }
        "content" => {
            let f: ContentFields = serde_json::from_value(value).map_err(fields)?;
            ServerEvent::Content { content: f.content }
        }
        "end" => ServerEvent::End,
        _ => ServerEvent::Unrecognized(kind.clone()),
    };
    Ok(event)
}
