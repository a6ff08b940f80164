//! Durable record of the running focus session.
//!
//! A single [`TimerRecord`] is the only source of truth for "is a focus
//! session running". Whoever owns the timer may be torn down and rebuilt at
//! any point (a new CLI process, an app reload), so remaining time is always
//! rederived from the stored start timestamp via [`remaining_seconds`].

use std::cell::RefCell;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

/// Key the record is stored under.
pub const TIMER_KEY: &str = "focusTimer";

/// Persisted focus timer state.
///
/// Field names on the wire are fixed; new fields may be added but existing
/// ones are never repurposed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerRecord {
    #[serde(rename = "active", alias = "activo")]
    pub active: bool,
    /// Wall-clock start of the running phase (ms since epoch).
    #[serde(rename = "tiempoInicioTimestamp", default)]
    pub start_timestamp_ms: u64,
    /// Planned total duration of the session.
    #[serde(rename = "duracionSegundos", default)]
    pub duration_secs: u64,
    #[serde(rename = "categoriaActual", default)]
    pub category: String,
    /// Set while the session is paused (ms since epoch).
    #[serde(
        rename = "pausadoEn",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub paused_at_ms: Option<u64>,
}

impl TimerRecord {
    pub fn running(start_timestamp_ms: u64, duration_secs: u64, category: &str) -> Self {
        Self {
            active: true,
            start_timestamp_ms,
            duration_secs,
            category: category.to_string(),
            paused_at_ms: None,
        }
    }

    /// An active record must carry a positive duration.
    pub fn is_valid(&self) -> bool {
        !self.active || self.duration_secs > 0
    }
}

/// `max(0, duration - floor((now - start) / 1000))`.
///
/// A start timestamp in the future counts as zero elapsed time.
pub fn remaining_seconds(start_timestamp_ms: u64, duration_secs: u64, now_ms: u64) -> u64 {
    let elapsed_secs = now_ms.saturating_sub(start_timestamp_ms) / 1000;
    duration_secs.saturating_sub(elapsed_secs)
}

/// Storage for the single [`TimerRecord`].
///
/// Implementations swallow their own failures: a broken store degrades the
/// timer to in-memory operation, it never stops it.
pub trait TimerStore {
    /// Overwrite the stored record.
    fn save(&self, record: &TimerRecord);

    /// The stored record, or `None` when absent, unreadable or invalid.
    fn load(&self) -> Option<TimerRecord>;

    /// Remove the stored record. Clearing an absent record is fine.
    fn clear(&self);
}

/// Parse a stored record, logging and discarding anything unusable.
pub(crate) fn decode_record(raw: &str) -> Option<TimerRecord> {
    match serde_json::from_str::<TimerRecord>(raw) {
        Ok(record) if record.is_valid() => Some(record),
        Ok(record) => {
            tracing::warn!(?record, "ignoring persisted timer record without a duration");
            None
        }
        Err(e) => {
            tracing::warn!(error = %e, "failed to parse persisted timer record");
            None
        }
    }
}

/// In-memory store. Clones share the same slot, so a test can hand one clone
/// to a timer and keep another to inspect or to "survive a reload".
#[derive(Debug, Clone, Default)]
pub struct MemoryTimerStore {
    slot: Rc<RefCell<Option<String>>>,
}

impl MemoryTimerStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the slot with raw text, e.g. to simulate a corrupt entry.
    pub fn with_raw(raw: &str) -> Self {
        Self {
            slot: Rc::new(RefCell::new(Some(raw.to_string()))),
        }
    }

    pub fn raw(&self) -> Option<String> {
        self.slot.borrow().clone()
    }
}

impl TimerStore for MemoryTimerStore {
    fn save(&self, record: &TimerRecord) {
        match serde_json::to_string(record) {
            Ok(json) => *self.slot.borrow_mut() = Some(json),
            Err(e) => tracing::warn!(error = %e, "failed to serialize timer record"),
        }
    }

    fn load(&self) -> Option<TimerRecord> {
        let raw = self.slot.borrow().clone()?;
        decode_record(&raw)
    }

    fn clear(&self) {
        self.slot.borrow_mut().take();
    }
}
