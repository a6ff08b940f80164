//! Per-category study log.
//!
//! A [`CategoryLog`] owns the session records of one category and keeps them
//! sorted by date after every insertion. Focus sessions committed on a day
//! that already has a record are merged into it instead of adding a second
//! entry for the same date.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// One logged study instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionRecord {
    /// Creation-time based; unique within its category.
    pub id: i64,
    pub date: NaiveDate,
    pub completed: bool,
    /// Positive when `completed`, zero otherwise.
    pub minutes: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_hour: Option<u8>,
}

/// Input for a manually entered record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NewRecord {
    pub date: NaiveDate,
    pub completed: bool,
    pub minutes: u32,
    pub start_hour: Option<u8>,
}

impl NewRecord {
    pub fn completed(date: NaiveDate, minutes: u32) -> Self {
        Self {
            date,
            completed: true,
            minutes,
            start_hour: None,
        }
    }

    pub fn missed(date: NaiveDate) -> Self {
        Self {
            date,
            completed: false,
            minutes: 0,
            start_hour: None,
        }
    }

    pub fn at_hour(mut self, hour: u8) -> Self {
        self.start_hour = Some(hour);
        self
    }

    fn validate(&self) -> Result<(), ValidationError> {
        if self.completed && self.minutes == 0 {
            return Err(ValidationError::MissingMinutes);
        }
        check_hour(self.start_hour)
    }
}

fn check_hour(hour: Option<u8>) -> Result<(), ValidationError> {
    match hour {
        Some(h) if h > 23 => Err(ValidationError::InvalidHour(h)),
        _ => Ok(()),
    }
}

/// The ordered record list of one category.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryLog {
    pub name: String,
    #[serde(default)]
    pub records: Vec<SessionRecord>,
}

impl CategoryLog {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            records: Vec::new(),
        }
    }

    pub fn records(&self) -> &[SessionRecord] {
        &self.records
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Add a manually entered record. Minutes of a missed day are dropped.
    pub fn add_record(
        &mut self,
        entry: NewRecord,
        now_ms: u64,
    ) -> Result<SessionRecord, ValidationError> {
        entry.validate()?;
        let record = SessionRecord {
            id: self.next_id(now_ms),
            date: entry.date,
            completed: entry.completed,
            minutes: if entry.completed { entry.minutes } else { 0 },
            start_hour: entry.start_hour,
        };
        self.insert_sorted(record.clone());
        Ok(record)
    }

    /// Credit a committed focus session to `date`.
    ///
    /// An existing record for that date accumulates the minutes and becomes
    /// completed; otherwise a new completed record is inserted.
    pub fn apply_focus(
        &mut self,
        date: NaiveDate,
        minutes: u32,
        start_hour: Option<u8>,
        now_ms: u64,
    ) -> Result<SessionRecord, ValidationError> {
        if minutes == 0 {
            return Err(ValidationError::MissingMinutes);
        }
        check_hour(start_hour)?;

        if let Some(existing) = self.records.iter_mut().find(|r| r.date == date) {
            existing.minutes = existing.minutes.saturating_add(minutes);
            existing.completed = true;
            if existing.start_hour.is_none() {
                existing.start_hour = start_hour;
            }
            return Ok(existing.clone());
        }

        let mut entry = NewRecord::completed(date, minutes);
        entry.start_hour = start_hour;
        self.add_record(entry, now_ms)
    }

    /// Remove a record by id. Returns whether anything was removed.
    pub fn delete_record(&mut self, id: i64) -> bool {
        let before = self.records.len();
        self.records.retain(|r| r.id != id);
        self.records.len() != before
    }

    /// Restore the ordering and value invariants on records from an outside
    /// source, such as an imported backup.
    ///
    /// A completed record without minutes cannot be repaired and is rejected,
    /// the same as a manual entry would be.
    pub fn normalize(&mut self) -> Result<(), ValidationError> {
        if self.records.iter().any(|r| r.completed && r.minutes == 0) {
            return Err(ValidationError::MissingMinutes);
        }
        for record in &mut self.records {
            if !record.completed {
                record.minutes = 0;
            }
            if record.start_hour.is_some_and(|h| h > 23) {
                record.start_hour = None;
            }
        }
        self.records.sort_by_key(|r| r.date);
        Ok(())
    }

    fn next_id(&self, now_ms: u64) -> i64 {
        let now = i64::try_from(now_ms).unwrap_or(i64::MAX);
        match self.records.iter().map(|r| r.id).max() {
            Some(max) if max >= now => max + 1,
            _ => now,
        }
    }

    /// Equal dates keep insertion order.
    fn insert_sorted(&mut self, record: SessionRecord) {
        let idx = self.records.partition_point(|r| r.date <= record.date);
        self.records.insert(idx, record);
    }
}
