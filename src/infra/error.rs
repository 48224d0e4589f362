use thiserror::Error;

/// Transport-level failure of one answer stream.
///
/// Any of these ends the stream; content already received is kept.
#[derive(Debug, Error)]
pub enum StreamError {
    /// DNS, connect or TLS failure
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
    /// Server answered with a non-success status
    #[error("server returned {status}: {body}")]
    Status { status: u16, body: String },
    /// Server answered with something other than an event stream
    #[error("expected text/event-stream, got {0}")]
    ContentType(String),
    /// Reading the body failed mid-stream
    #[error("stream read error: {0}")]
    Read(#[from] std::io::Error),
    /// Body ended before an `end` event
    #[error("stream closed before end")]
    Closed,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_status() {
        let e = StreamError::Status { status: 503, body: "busy".into() };
        assert_eq!(e.to_string(), "server returned 503: busy");
    }

    #[test]
    fn display_content_type() {
        let e = StreamError::ContentType("text/html".into());
        assert_eq!(e.to_string(), "expected text/event-stream, got text/html");
    }

    #[test]
    fn display_closed() {
        assert_eq!(StreamError::Closed.to_string(), "stream closed before end");
    }

    #[test]
    fn display_read() {
        let e = StreamError::from(std::io::Error::new(std::io::ErrorKind::ConnectionReset, "reset"));
        assert_eq!(e.to_string(), "stream read error: reset");
    }
}
