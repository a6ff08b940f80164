use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::timer::FocusState;

/// Every focus timer state change produces an Event.
/// The CLI prints them; the study log consumes `SessionCommitted`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    FocusStarted {
        category: String,
        duration_secs: u64,
        started_at: DateTime<Utc>,
    },
    FocusPaused {
        remaining_secs: u64,
        at: DateTime<Utc>,
    },
    FocusResumed {
        remaining_secs: u64,
        at: DateTime<Utc>,
    },
    /// A persisted session was picked up again after a restart.
    FocusRecovered {
        state: FocusState,
        category: String,
        remaining_secs: u64,
        at: DateTime<Utc>,
    },
    FocusCompleted {
        category: String,
        studied_secs: u64,
        started_at: DateTime<Utc>,
        /// Planned end of the session, even when completion is noticed later.
        ended_at: DateTime<Utc>,
        /// True when completion was discovered by `recover()` rather than a tick.
        recovered: bool,
        at: DateTime<Utc>,
    },
    FocusCancelled {
        category: String,
        elapsed_secs: u64,
        /// Whole minutes the caller may still choose to commit.
        partial_minutes: u32,
        started_at: DateTime<Utc>,
        at: DateTime<Utc>,
    },
    /// Minutes to credit to the category's study log.
    SessionCommitted {
        category: String,
        minutes: u32,
        started_at: DateTime<Utc>,
        ended_at: DateTime<Utc>,
        at: DateTime<Utc>,
    },
    StateSnapshot {
        state: FocusState,
        category: String,
        selected_minutes: u32,
        remaining_secs: u64,
        elapsed_secs: u64,
        at: DateTime<Utc>,
    },
}
