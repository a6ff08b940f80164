//! Focus timer record kept in the database's key-value table.

use super::database::Database;
use crate::timer::{decode_record, TimerRecord, TimerStore, TIMER_KEY};

/// [`TimerStore`] over the `kv` table, under [`TIMER_KEY`].
///
/// Database failures are logged and otherwise ignored; the timer then runs
/// from memory for the rest of the session.
pub struct KvTimerStore<'a> {
    db: &'a Database,
}

impl<'a> KvTimerStore<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }
}

impl TimerStore for KvTimerStore<'_> {
    fn save(&self, record: &TimerRecord) {
        let json = match serde_json::to_string(record) {
            Ok(json) => json,
            Err(e) => {
                tracing::warn!(error = %e, "failed to serialize timer record");
                return;
            }
        };
        if let Err(e) = self.db.kv_set(TIMER_KEY, &json) {
            tracing::warn!(error = %e, "failed to persist timer record");
        }
    }

    fn load(&self) -> Option<TimerRecord> {
        match self.db.kv_get(TIMER_KEY) {
            Ok(Some(raw)) => decode_record(&raw),
            Ok(None) => None,
            Err(e) => {
                tracing::warn!(error = %e, "failed to read timer record");
                None
            }
        }
    }

    fn clear(&self) {
        if let Err(e) = self.db.kv_delete(TIMER_KEY) {
            tracing::warn!(error = %e, "failed to clear timer record");
        }
    }
}
