//! # studytrack Core Library
//!
//! This library provides the core logic for studytrack, a personal study log
//! with a focus timer. Everything is available through the `studytrack` CLI,
//! which is a thin layer over this crate.
//!
//! ## Architecture
//!
//! - **Focus Timer**: A wall-clock-based state machine that requires the caller
//!   to periodically invoke `tick()`; its only durable state is a single
//!   persisted record, so it can be rebuilt and recovered at any time
//! - **Study Log**: Per-category session records, kept sorted by date
//! - **Metrics**: Completion rate, trend, streak and suggested targets
//! - **Storage**: SQLite-based study log and TOML-based configuration
//!
//! ## Key Components
//!
//! - [`FocusTimer`]: Focus timer state machine
//! - [`TimerStore`]: Persistence seam for the running session
//! - [`CategoryLog`]: Ordered record list of one category
//! - [`MetricsCalculator`]: Derived statistics for a category
//! - [`Database`]: Study log persistence
//! - [`Config`]: Application configuration management

pub mod error;
pub mod events;
pub mod records;
pub mod stats;
pub mod storage;
pub mod timer;

pub use error::{ConfigError, CoreError, DatabaseError, TimerError, ValidationError};
pub use events::Event;
pub use records::{CategoryLog, NewRecord, SessionRecord};
pub use stats::{calculate_metrics, CategoryMetrics, MetricsCalculator, Trend};
pub use storage::{Backup, Config, Database, KvTimerStore};
pub use timer::{
    Clock, FocusState, FocusTimer, ManualClock, MemoryTimerStore, Notifier, SystemClock,
    TimerRecord, TimerStore, WakeLock,
};
