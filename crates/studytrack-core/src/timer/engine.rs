//! Focus timer state machine.
//!
//! Like the rest of the core, the timer has no internal thread: the caller
//! invokes `tick()` periodically. Remaining time is never accumulated across
//! ticks. It is recomputed from the persisted start timestamp on every read,
//! so a missed tick, a suspended process or a full restart cost nothing.
//!
//! ## State Transitions
//!
//! ```text
//! Idle -> Running <-> Paused
//! Running -> Completed -> Idle      (tick reaches zero, then commit)
//! Running | Paused -> Idle          (cancel)
//! ```
//!
//! ## Usage
//!
//! ```ignore
//! let mut timer = FocusTimer::new(store, Arc::new(SystemClock));
//! timer.recover();                  // once, at startup
//! timer.set_category("Math")?;
//! timer.select_duration(25)?;
//! timer.start()?;
//! // In a loop:
//! if let Some(Event::FocusCompleted { .. }) = timer.tick() {
//!     let committed = timer.commit_studied()?;
//! }
//! ```

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::capability::{
    NoopNotifier, NoopWakeLock, Notification, Notifier, Permission, WakeLock, WakeLockHandle,
};
use super::clock::{to_datetime, Clock};
use super::persistence::{remaining_seconds, TimerRecord, TimerStore};
use crate::error::{Result, TimerError, ValidationError};
use crate::events::Event;

pub const MIN_FOCUS_MINUTES: u32 = 1;
pub const MAX_FOCUS_MINUTES: u32 = 60;
pub const DEFAULT_FOCUS_MINUTES: u32 = 30;

const COMPLETION_TAG: &str = "focus-complete";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FocusState {
    /// Picking a duration.
    Idle,
    Running,
    Paused,
    /// Finished, waiting for the studied minutes to be committed.
    Completed,
}

/// Clamp a requested focus length into the supported range.
pub fn clamp_minutes(minutes: u32) -> u32 {
    minutes.clamp(MIN_FOCUS_MINUTES, MAX_FOCUS_MINUTES)
}

/// Focus timer backed by a [`TimerStore`].
pub struct FocusTimer<S: TimerStore> {
    store: S,
    clock: Arc<dyn Clock>,
    notifier: Box<dyn Notifier>,
    wake_lock: Box<dyn WakeLock>,
    wake_handle: Option<WakeLockHandle>,
    permission: Option<Permission>,
    state: FocusState,
    category: String,
    selected_minutes: u32,
    /// Planned length of the current (or last) session.
    duration_secs: u64,
    start_timestamp_ms: Option<u64>,
    paused_at_ms: Option<u64>,
    /// Credited time once the session completed.
    studied_secs: u64,
}

impl<S: TimerStore> FocusTimer<S> {
    /// Create an idle timer. Capabilities default to no-ops.
    pub fn new(store: S, clock: Arc<dyn Clock>) -> Self {
        Self {
            store,
            clock,
            notifier: Box::new(NoopNotifier),
            wake_lock: Box::new(NoopWakeLock),
            wake_handle: None,
            permission: None,
            state: FocusState::Idle,
            category: String::new(),
            selected_minutes: DEFAULT_FOCUS_MINUTES,
            duration_secs: u64::from(DEFAULT_FOCUS_MINUTES) * 60,
            start_timestamp_ms: None,
            paused_at_ms: None,
            studied_secs: 0,
        }
    }

    pub fn with_notifier(mut self, notifier: Box<dyn Notifier>) -> Self {
        self.notifier = notifier;
        self
    }

    pub fn with_wake_lock(mut self, wake_lock: Box<dyn WakeLock>) -> Self {
        self.wake_lock = wake_lock;
        self
    }

    pub fn with_default_minutes(mut self, minutes: u32) -> Self {
        self.selected_minutes = clamp_minutes(minutes);
        self.duration_secs = u64::from(self.selected_minutes) * 60;
        self
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn state(&self) -> FocusState {
        self.state
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn selected_minutes(&self) -> u32 {
        self.selected_minutes
    }

    pub fn duration_secs(&self) -> u64 {
        self.duration_secs
    }

    pub fn studied_secs(&self) -> u64 {
        self.studied_secs
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn holds_wake_lock(&self) -> bool {
        self.wake_handle.is_some()
    }

    pub fn remaining_secs(&self) -> u64 {
        match self.state {
            FocusState::Idle => u64::from(self.selected_minutes) * 60,
            FocusState::Running => self.remaining_at(self.now()),
            FocusState::Paused => self.remaining_at(self.paused_at_ms.unwrap_or_else(|| self.now())),
            FocusState::Completed => 0,
        }
    }

    pub fn elapsed_secs(&self) -> u64 {
        match self.state {
            FocusState::Idle => 0,
            FocusState::Running => self.elapsed_at(self.now()),
            FocusState::Paused => self.elapsed_at(self.paused_at_ms.unwrap_or_else(|| self.now())),
            FocusState::Completed => self.studied_secs,
        }
    }

    /// Build a full state snapshot event.
    pub fn snapshot(&self) -> Event {
        Event::StateSnapshot {
            state: self.state,
            category: self.category.clone(),
            selected_minutes: self.selected_minutes,
            remaining_secs: self.remaining_secs(),
            elapsed_secs: self.elapsed_secs(),
            at: to_datetime(self.now()),
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    pub fn set_category(&mut self, category: &str) -> Result<(), TimerError> {
        self.expect_state("change category", &[FocusState::Idle])?;
        self.category = category.trim().to_string();
        Ok(())
    }

    /// Pick the session length; out-of-range values are clamped to 1..=60.
    pub fn select_duration(&mut self, minutes: u32) -> Result<u32, TimerError> {
        self.expect_state("select a duration", &[FocusState::Idle])?;
        self.selected_minutes = clamp_minutes(minutes);
        self.duration_secs = u64::from(self.selected_minutes) * 60;
        Ok(self.selected_minutes)
    }

    pub fn start(&mut self) -> Result<Event> {
        self.expect_state("start", &[FocusState::Idle])?;
        if self.category.is_empty() {
            return Err(ValidationError::EmptyCategory.into());
        }

        let now = self.now();
        self.duration_secs = u64::from(self.selected_minutes) * 60;
        self.start_timestamp_ms = Some(now);
        self.paused_at_ms = None;
        self.studied_secs = 0;
        self.state = FocusState::Running;
        self.persist();
        self.ensure_permission();
        self.acquire_wake_lock();

        tracing::info!(
            category = %self.category,
            duration_secs = self.duration_secs,
            "focus session started"
        );
        Ok(Event::FocusStarted {
            category: self.category.clone(),
            duration_secs: self.duration_secs,
            started_at: to_datetime(now),
        })
    }

    /// Call periodically while running. Returns `Some(Event::FocusCompleted)`
    /// exactly once, when the session reaches zero.
    pub fn tick(&mut self) -> Option<Event> {
        if self.state != FocusState::Running {
            return None;
        }
        if self.remaining_at(self.now()) == 0 {
            return Some(self.complete(false));
        }
        None
    }

    /// Running -> Paused or Paused -> Running.
    ///
    /// The pause point is persisted, so a paused session stays paused across
    /// restarts. On resume the start timestamp moves forward by the paused
    /// span, which keeps paused time out of the elapsed total.
    pub fn toggle_pause(&mut self) -> Result<Event, TimerError> {
        let now = self.now();
        match self.state {
            FocusState::Running => {
                self.paused_at_ms = Some(now);
                self.state = FocusState::Paused;
                self.persist();
                self.release_wake_lock();
                tracing::debug!("focus session paused");
                Ok(Event::FocusPaused {
                    remaining_secs: self.remaining_at(now),
                    at: to_datetime(now),
                })
            }
            FocusState::Paused => {
                if let (Some(start), Some(paused_at)) =
                    (self.start_timestamp_ms, self.paused_at_ms.take())
                {
                    self.start_timestamp_ms = Some(start + now.saturating_sub(paused_at));
                }
                self.state = FocusState::Running;
                self.persist();
                self.acquire_wake_lock();
                tracing::debug!("focus session resumed");
                Ok(Event::FocusResumed {
                    remaining_secs: self.remaining_at(now),
                    at: to_datetime(now),
                })
            }
            state => Err(TimerError::InvalidTransition {
                operation: "pause or resume",
                state,
            }),
        }
    }

    /// Pick up a persisted session. Call once at startup.
    ///
    /// A session whose end passed while nobody was watching completes right
    /// away with its full planned duration. Does nothing unless idle.
    pub fn recover(&mut self) -> Option<Event> {
        if self.state != FocusState::Idle {
            return None;
        }
        let record = self.store.load()?;
        if !record.active {
            return None;
        }

        self.category = record.category.clone();
        self.duration_secs = record.duration_secs;
        self.selected_minutes = clamp_minutes(
            u32::try_from(record.duration_secs.div_ceil(60)).unwrap_or(MAX_FOCUS_MINUTES),
        );
        self.start_timestamp_ms = Some(record.start_timestamp_ms);
        self.paused_at_ms = record.paused_at_ms;
        self.studied_secs = 0;

        let now = self.now();
        if let Some(paused_at) = record.paused_at_ms {
            self.state = FocusState::Paused;
            let remaining_secs = self.remaining_at(paused_at);
            tracing::info!(category = %self.category, remaining_secs, "recovered paused focus session");
            return Some(Event::FocusRecovered {
                state: self.state,
                category: self.category.clone(),
                remaining_secs,
                at: to_datetime(now),
            });
        }

        let remaining_secs = self.remaining_at(now);
        if remaining_secs > 0 {
            self.state = FocusState::Running;
            self.acquire_wake_lock();
            tracing::info!(category = %self.category, remaining_secs, "recovered running focus session");
            Some(Event::FocusRecovered {
                state: self.state,
                category: self.category.clone(),
                remaining_secs,
                at: to_datetime(now),
            })
        } else {
            self.state = FocusState::Running;
            Some(self.complete(true))
        }
    }

    /// Credit `minutes` to the category and return to idle.
    ///
    /// Zero minutes returns to idle without emitting anything.
    pub fn commit(&mut self, minutes: u32) -> Result<Option<Event>, TimerError> {
        self.expect_state("commit", &[FocusState::Completed])?;
        let now = self.now();
        let event = (minutes > 0).then(|| Event::SessionCommitted {
            category: self.category.clone(),
            minutes,
            started_at: to_datetime(self.start_timestamp_ms.unwrap_or(now)),
            ended_at: to_datetime(self.ended_at(now)),
            at: to_datetime(now),
        });
        self.reset_to_idle();
        Ok(event)
    }

    /// Commit the whole minutes studied in the completed session.
    pub fn commit_studied(&mut self) -> Result<Option<Event>, TimerError> {
        let minutes = (self.studied_secs / 60) as u32;
        self.commit(minutes)
    }

    /// Commit the completed session and immediately start another round of
    /// the same length.
    pub fn commit_and_restart(&mut self) -> Result<(Option<Event>, Event)> {
        let committed = self.commit_studied()?;
        let started = self.start()?;
        Ok((committed, started))
    }

    /// Abandon a running or paused session.
    ///
    /// Persisted state is cleared and the wake lock released no matter what;
    /// the returned event carries the partial minutes so the caller can
    /// decide whether to commit them.
    pub fn cancel(&mut self) -> Result<Event, TimerError> {
        self.expect_state("cancel", &[FocusState::Running, FocusState::Paused])?;
        let now = self.now();
        let elapsed_secs = self.elapsed_secs();
        let event = Event::FocusCancelled {
            category: self.category.clone(),
            elapsed_secs,
            partial_minutes: (elapsed_secs / 60) as u32,
            started_at: to_datetime(self.start_timestamp_ms.unwrap_or(now)),
            at: to_datetime(now),
        };
        self.release_wake_lock();
        self.store.clear();
        self.reset_to_idle();
        tracing::info!(elapsed_secs, "focus session cancelled");
        Ok(event)
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn now(&self) -> u64 {
        self.clock.now_ms()
    }

    fn expect_state(
        &self,
        operation: &'static str,
        allowed: &[FocusState],
    ) -> Result<(), TimerError> {
        if allowed.contains(&self.state) {
            Ok(())
        } else {
            Err(TimerError::InvalidTransition {
                operation,
                state: self.state,
            })
        }
    }

    fn remaining_at(&self, at_ms: u64) -> u64 {
        match self.start_timestamp_ms {
            Some(start) => remaining_seconds(start, self.duration_secs, at_ms),
            None => self.duration_secs,
        }
    }

    fn elapsed_at(&self, at_ms: u64) -> u64 {
        self.duration_secs - self.remaining_at(at_ms)
    }

    /// Start plus planned duration, capped at `now_ms`. Pauses already moved
    /// the start forward, so this is when the session actually ran out.
    fn ended_at(&self, now_ms: u64) -> u64 {
        self.start_timestamp_ms.map_or(now_ms, |start| {
            start
                .saturating_add(self.duration_secs.saturating_mul(1000))
                .min(now_ms)
        })
    }

    fn persist(&self) {
        if let Some(start) = self.start_timestamp_ms {
            let mut record = TimerRecord::running(start, self.duration_secs, &self.category);
            record.paused_at_ms = self.paused_at_ms;
            self.store.save(&record);
        }
    }

    fn complete(&mut self, recovered: bool) -> Event {
        let now = self.now();
        self.release_wake_lock();
        self.store.clear();
        self.studied_secs = self.duration_secs;
        self.paused_at_ms = None;
        self.state = FocusState::Completed;

        let minutes = self.studied_secs / 60;
        tracing::info!(category = %self.category, minutes, recovered, "focus session completed");
        self.notify(&Notification {
            title: "Focus session complete".to_string(),
            body: format!("You studied {minutes} minutes of {}", self.category),
            tag: Some(COMPLETION_TAG.to_string()),
        });

        Event::FocusCompleted {
            category: self.category.clone(),
            studied_secs: self.studied_secs,
            started_at: to_datetime(self.start_timestamp_ms.unwrap_or(now)),
            ended_at: to_datetime(self.ended_at(now)),
            recovered,
            at: to_datetime(now),
        }
    }

    fn reset_to_idle(&mut self) {
        self.state = FocusState::Idle;
        self.start_timestamp_ms = None;
        self.paused_at_ms = None;
        self.studied_secs = 0;
        self.duration_secs = u64::from(self.selected_minutes) * 60;
    }

    fn ensure_permission(&mut self) -> Permission {
        if let Some(permission) = self.permission {
            return permission;
        }
        let permission = self.notifier.request_permission();
        self.permission = Some(permission);
        permission
    }

    fn notify(&mut self, notification: &Notification) {
        if self.ensure_permission() != Permission::Granted {
            tracing::debug!("notification permission not granted, skipping");
            return;
        }
        if let Err(e) = self.notifier.show(notification) {
            tracing::warn!(error = %e, "failed to show notification");
        }
    }

    fn acquire_wake_lock(&mut self) {
        if self.wake_handle.is_some() {
            return;
        }
        match self.wake_lock.acquire() {
            Ok(handle) => self.wake_handle = Some(handle),
            Err(e) => tracing::debug!(error = %e, "wake lock unavailable"),
        }
    }

    fn release_wake_lock(&mut self) {
        if let Some(handle) = self.wake_handle.take() {
            self.wake_lock.release(handle);
        }
    }
}

impl<S: TimerStore> Drop for FocusTimer<S> {
    /// Tearing the timer down gives the wake lock back but leaves the
    /// persisted record alone, so the session can be recovered later.
    fn drop(&mut self) {
        self.release_wake_lock();
    }
}

#[cfg(test)]
mod tests {
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    use super::*;
    use crate::error::CoreError;
    use crate::timer::capability::CapabilityError;
    use crate::timer::clock::ManualClock;
    use crate::timer::persistence::MemoryTimerStore;

    const T0: u64 = 1_700_000_000_000;

    #[derive(Clone, Default)]
    struct RecordingNotifier {
        shown: Rc<RefCell<Vec<Notification>>>,
        fail: bool,
    }

    impl Notifier for RecordingNotifier {
        fn request_permission(&mut self) -> Permission {
            Permission::Granted
        }

        fn show(&mut self, notification: &Notification) -> Result<(), CapabilityError> {
            if self.fail {
                return Err(CapabilityError::Failed("display gone".into()));
            }
            self.shown.borrow_mut().push(notification.clone());
            Ok(())
        }
    }

    #[derive(Clone, Default)]
    struct CountingWakeLock {
        held: Rc<Cell<i32>>,
        unsupported: bool,
    }

    impl WakeLock for CountingWakeLock {
        fn acquire(&mut self) -> Result<WakeLockHandle, CapabilityError> {
            if self.unsupported {
                return Err(CapabilityError::Unsupported("wake lock"));
            }
            self.held.set(self.held.get() + 1);
            Ok(WakeLockHandle(7))
        }

        fn release(&mut self, _handle: WakeLockHandle) {
            self.held.set(self.held.get() - 1);
        }
    }

    struct Rig {
        clock: ManualClock,
        store: MemoryTimerStore,
        notifier: RecordingNotifier,
        wake: CountingWakeLock,
    }

    impl Rig {
        fn new() -> Self {
            Self {
                clock: ManualClock::new(T0),
                store: MemoryTimerStore::new(),
                notifier: RecordingNotifier::default(),
                wake: CountingWakeLock::default(),
            }
        }

        /// A fresh timer over the same store, as after a restart.
        fn timer(&self) -> FocusTimer<MemoryTimerStore> {
            FocusTimer::new(self.store.clone(), Arc::new(self.clock.clone()))
                .with_notifier(Box::new(self.notifier.clone()))
                .with_wake_lock(Box::new(self.wake.clone()))
        }

        fn running(&self, minutes: u32) -> FocusTimer<MemoryTimerStore> {
            let mut timer = self.timer();
            timer.set_category("Math").unwrap();
            timer.select_duration(minutes).unwrap();
            timer.start().unwrap();
            timer
        }

        fn notifications(&self) -> usize {
            self.notifier.shown.borrow().len()
        }
    }

    #[test]
    fn select_duration_clamps_into_range() {
        let rig = Rig::new();
        let mut timer = rig.timer();
        assert_eq!(timer.select_duration(0).unwrap(), 1);
        assert_eq!(timer.select_duration(61).unwrap(), 60);
        assert_eq!(timer.select_duration(25).unwrap(), 25);
        assert_eq!(timer.remaining_secs(), 25 * 60);
    }

    #[test]
    fn select_duration_only_while_idle() {
        let rig = Rig::new();
        let mut timer = rig.running(10);
        assert!(timer.select_duration(20).is_err());
        assert_eq!(timer.selected_minutes(), 10);
    }

    #[test]
    fn start_persists_record_and_takes_wake_lock() {
        let rig = Rig::new();
        let timer = rig.running(30);

        assert_eq!(timer.state(), FocusState::Running);
        assert!(timer.holds_wake_lock());
        assert_eq!(rig.wake.held.get(), 1);

        let record = rig.store.load().unwrap();
        assert!(record.active);
        assert_eq!(record.start_timestamp_ms, T0);
        assert_eq!(record.duration_secs, 1800);
        assert_eq!(record.category, "Math");
    }

    #[test]
    fn start_requires_a_category() {
        let rig = Rig::new();
        let mut timer = rig.timer();
        timer.set_category("   ").unwrap();
        let err = timer.start().unwrap_err();
        assert!(matches!(
            err,
            CoreError::Validation(ValidationError::EmptyCategory)
        ));
        assert_eq!(timer.state(), FocusState::Idle);
        assert!(rig.store.load().is_none());
    }

    #[test]
    fn start_twice_is_rejected() {
        let rig = Rig::new();
        let mut timer = rig.running(5);
        assert!(matches!(
            timer.start(),
            Err(CoreError::Timer(TimerError::InvalidTransition { .. }))
        ));
    }

    #[test]
    fn wake_lock_failure_does_not_block_start() {
        let mut rig = Rig::new();
        rig.wake.unsupported = true;
        let timer = rig.running(5);
        assert_eq!(timer.state(), FocusState::Running);
        assert!(!timer.holds_wake_lock());
    }

    #[test]
    fn tick_reports_nothing_before_the_end() {
        let rig = Rig::new();
        let mut timer = rig.running(30);
        rig.clock.advance_secs(10 * 60);
        assert!(timer.tick().is_none());
        assert_eq!(timer.remaining_secs(), 20 * 60);
        assert_eq!(timer.elapsed_secs(), 10 * 60);
    }

    #[test]
    fn tick_completes_exactly_once() {
        let rig = Rig::new();
        let mut timer = rig.running(1);
        rig.clock.advance_secs(60);

        let event = timer.tick().unwrap();
        assert!(matches!(
            event,
            Event::FocusCompleted { studied_secs: 60, recovered: false, .. }
        ));
        assert_eq!(timer.state(), FocusState::Completed);
        assert!(rig.store.load().is_none());
        assert_eq!(rig.wake.held.get(), 0);

        rig.clock.advance_secs(5);
        assert!(timer.tick().is_none());
        assert!(timer.tick().is_none());
        assert_eq!(rig.notifications(), 1);
    }

    #[test]
    fn missed_ticks_still_credit_the_full_duration() {
        let rig = Rig::new();
        let mut timer = rig.running(25);
        rig.clock.advance_secs(3 * 3600);
        assert!(timer.tick().is_some());
        assert_eq!(timer.studied_secs(), 25 * 60);
    }

    #[test]
    fn notification_mentions_minutes_and_category() {
        let rig = Rig::new();
        let mut timer = rig.running(2);
        rig.clock.advance_secs(120);
        timer.tick();
        let shown = rig.notifier.shown.borrow();
        assert_eq!(shown[0].body, "You studied 2 minutes of Math");
        assert_eq!(shown[0].tag.as_deref(), Some("focus-complete"));
    }

    #[test]
    fn notifier_failure_does_not_block_completion() {
        let mut rig = Rig::new();
        rig.notifier.fail = true;
        let mut timer = rig.running(1);
        rig.clock.advance_secs(61);
        assert!(timer.tick().is_some());
        assert_eq!(timer.state(), FocusState::Completed);
        assert!(timer.commit_studied().unwrap().is_some());
    }

    #[test]
    fn paused_time_does_not_count() {
        let rig = Rig::new();
        let mut timer = rig.running(10);
        rig.clock.advance_secs(4 * 60);

        assert!(matches!(
            timer.toggle_pause().unwrap(),
            Event::FocusPaused { remaining_secs: 360, .. }
        ));
        assert_eq!(rig.store.load().unwrap().paused_at_ms, Some(T0 + 240_000));
        assert_eq!(rig.wake.held.get(), 0);

        rig.clock.advance_secs(30 * 60);
        assert!(timer.tick().is_none());
        assert_eq!(timer.remaining_secs(), 360);

        timer.toggle_pause().unwrap();
        assert_eq!(timer.state(), FocusState::Running);
        assert_eq!(rig.wake.held.get(), 1);
        let record = rig.store.load().unwrap();
        assert_eq!(record.paused_at_ms, None);
        assert_eq!(record.start_timestamp_ms, T0 + 30 * 60 * 1000);

        rig.clock.advance_secs(359);
        assert!(timer.tick().is_none());
        rig.clock.advance_secs(1);
        assert!(timer.tick().is_some());
    }

    #[test]
    fn toggle_pause_rejected_while_idle() {
        let rig = Rig::new();
        let mut timer = rig.timer();
        assert!(timer.toggle_pause().is_err());
    }

    #[test]
    fn recover_resumes_a_running_session() {
        let rig = Rig::new();
        drop(rig.running(30));
        rig.clock.advance_secs(10 * 60);

        let mut timer = rig.timer();
        let event = timer.recover().unwrap();
        assert!(matches!(
            event,
            Event::FocusRecovered { state: FocusState::Running, remaining_secs: 1200, .. }
        ));
        assert_eq!(timer.category(), "Math");
        assert_eq!(timer.selected_minutes(), 30);
        assert!(timer.holds_wake_lock());
    }

    #[test]
    fn recover_keeps_a_paused_session_paused() {
        let rig = Rig::new();
        let mut first = rig.running(10);
        rig.clock.advance_secs(60);
        first.toggle_pause().unwrap();
        drop(first);

        rig.clock.advance_secs(3600);
        let mut timer = rig.timer();
        let event = timer.recover().unwrap();
        assert!(matches!(
            event,
            Event::FocusRecovered { state: FocusState::Paused, remaining_secs: 540, .. }
        ));
        assert_eq!(timer.remaining_secs(), 540);
        assert_eq!(rig.notifications(), 0);
    }

    #[test]
    fn recover_after_the_end_credits_the_session_once() {
        let rig = Rig::new();
        drop(rig.running(30));
        rig.clock.advance_secs(31 * 60);

        let mut timer = rig.timer();
        let event = timer.recover().unwrap();
        assert!(matches!(
            event,
            Event::FocusCompleted { studied_secs: 1800, recovered: true, .. }
        ));
        assert_eq!(rig.notifications(), 1);
        assert!(rig.store.load().is_none());

        match timer.commit_studied().unwrap() {
            Some(Event::SessionCommitted {
                minutes,
                category,
                ended_at,
                at,
                ..
            }) => {
                assert_eq!(minutes, 30);
                assert_eq!(category, "Math");
                assert_eq!(ended_at, to_datetime(T0 + 30 * 60_000));
                assert_eq!(at, to_datetime(T0 + 31 * 60_000));
            }
            other => panic!("expected SessionCommitted, got {other:?}"),
        }

        assert!(timer.recover().is_none());
        assert!(rig.timer().recover().is_none());
        assert_eq!(rig.notifications(), 1);
    }

    #[test]
    fn recover_clamps_an_oversized_stored_duration() {
        let rig = Rig::new();
        rig.store
            .save(&TimerRecord::running(T0, 5_000_000_000 * 60, "Math"));
        let mut timer = rig.timer();
        timer.recover().unwrap();

        assert_eq!(timer.state(), FocusState::Running);
        assert_eq!(timer.selected_minutes(), MAX_FOCUS_MINUTES);
        assert_eq!(timer.duration_secs(), 5_000_000_000 * 60);
    }

    #[test]
    fn recover_twice_while_running_is_a_no_op() {
        let rig = Rig::new();
        drop(rig.running(30));
        let mut timer = rig.timer();
        assert!(timer.recover().is_some());
        assert!(timer.recover().is_none());
        assert_eq!(rig.wake.held.get(), 1);
    }

    #[test]
    fn recover_with_corrupt_store_starts_clean() {
        let rig = Rig::new();
        let mut timer = FocusTimer::new(
            MemoryTimerStore::with_raw("{{{"),
            Arc::new(rig.clock.clone()),
        );
        assert!(timer.recover().is_none());
        timer.set_category("Art").unwrap();
        assert!(timer.start().is_ok());
    }

    #[test]
    fn commit_only_when_completed() {
        let rig = Rig::new();
        let mut timer = rig.running(5);
        assert!(timer.commit(5).is_err());
    }

    #[test]
    fn commit_zero_minutes_emits_nothing() {
        let rig = Rig::new();
        let mut timer = rig.running(1);
        rig.clock.advance_secs(60);
        timer.tick();
        assert_eq!(timer.commit(0).unwrap(), None);
        assert_eq!(timer.state(), FocusState::Idle);
    }

    #[test]
    fn commit_and_restart_runs_another_round() {
        let rig = Rig::new();
        let mut timer = rig.running(15);
        rig.clock.advance_secs(15 * 60);
        timer.tick();

        let (committed, started) = timer.commit_and_restart().unwrap();
        assert!(matches!(committed, Some(Event::SessionCommitted { minutes: 15, .. })));
        assert!(matches!(started, Event::FocusStarted { duration_secs: 900, .. }));
        assert_eq!(timer.state(), FocusState::Running);
        assert_eq!(
            rig.store.load().unwrap().start_timestamp_ms,
            T0 + 15 * 60 * 1000
        );
    }

    #[test]
    fn cancel_reports_partial_minutes_and_cleans_up() {
        let rig = Rig::new();
        let mut timer = rig.running(30);
        rig.clock.advance_secs(5 * 60 + 30);

        let event = timer.cancel().unwrap();
        assert!(matches!(
            event,
            Event::FocusCancelled { elapsed_secs: 330, partial_minutes: 5, .. }
        ));
        assert_eq!(timer.state(), FocusState::Idle);
        assert!(rig.store.load().is_none());
        assert_eq!(rig.wake.held.get(), 0);
        assert_eq!(rig.notifications(), 0);
    }

    #[test]
    fn cancel_while_paused_counts_up_to_the_pause() {
        let rig = Rig::new();
        let mut timer = rig.running(30);
        rig.clock.advance_secs(120);
        timer.toggle_pause().unwrap();
        rig.clock.advance_secs(600);
        assert!(matches!(
            timer.cancel().unwrap(),
            Event::FocusCancelled { elapsed_secs: 120, partial_minutes: 2, .. }
        ));
    }

    #[test]
    fn cancel_while_idle_is_rejected() {
        let rig = Rig::new();
        let mut timer = rig.timer();
        assert!(timer.cancel().is_err());
    }

    #[test]
    fn snapshot_reflects_state() {
        let rig = Rig::new();
        let timer = rig.timer().with_default_minutes(45);
        match timer.snapshot() {
            Event::StateSnapshot {
                state,
                selected_minutes,
                remaining_secs,
                ..
            } => {
                assert_eq!(state, FocusState::Idle);
                assert_eq!(selected_minutes, 45);
                assert_eq!(remaining_secs, 45 * 60);
            }
            other => panic!("Expected StateSnapshot, got {other:?}"),
        }
    }
}
