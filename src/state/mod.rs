//! State types split into domain-focused modules.
//!
//! - `session`: Session identity for one conversation
//! - `stream`: Stage, StreamStatus, StreamState (the per-query reducer)
//! - `runtime`: State struct (input box, scroll, redraw flags)

pub mod runtime;
pub mod session;
pub mod stream;

pub use runtime::State;
pub use session::Session;
pub use stream::{Stage, StreamState, StreamStatus};
