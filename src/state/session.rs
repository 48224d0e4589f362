use chrono::{DateTime, Local};

use crate::constants::{INITIAL_SESSION_ID, SESSION_PREFIX};

/// Identity of one conversation. Never mutated; replaced wholesale.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    id: String,
    started_at: DateTime<Local>,
}

impl Session {
    /// The session a fresh start opens with.
    pub fn initial() -> Self {
        Self { id: INITIAL_SESSION_ID.to_string(), started_at: Local::now() }
    }

    /// Mint a new, unique session.
    pub fn fresh() -> Self {
        Self { id: format!("{}{}", SESSION_PREFIX, uuid::Uuid::new_v4().simple()), started_at: Local::now() }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn started_at(&self) -> DateTime<Local> {
        self.started_at
    }

    /// First 8 chars after the prefix, for the header.
    pub fn short_id(&self) -> &str {
        let rest = self.id.strip_prefix(SESSION_PREFIX).unwrap_or(&self.id);
        match rest.char_indices().nth(8) {
            Some((idx, _)) => &rest[..idx],
            None => rest,
        }
    }
}
