mod capability;
mod clock;
mod engine;
mod persistence;

pub use capability::{
    CapabilityError, NoopNotifier, NoopWakeLock, Notification, Notifier, Permission, WakeLock,
    WakeLockHandle,
};
pub use clock::{to_datetime, Clock, ManualClock, SystemClock};
pub use engine::{
    clamp_minutes, FocusState, FocusTimer, DEFAULT_FOCUS_MINUTES, MAX_FOCUS_MINUTES,
    MIN_FOCUS_MINUTES,
};
pub use persistence::{remaining_seconds, MemoryTimerStore, TimerRecord, TimerStore, TIMER_KEY};

pub(crate) use persistence::decode_record;
