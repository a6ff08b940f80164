//! Host capabilities the focus timer consults: notifications and wake lock.
//!
//! Both are optional. A host without them uses the no-op implementations and
//! the timer behaves exactly the same apart from the missing side effect.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Failure of an auxiliary capability. Never fatal to the timer.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CapabilityError {
    #[error("{0} is not supported on this host")]
    Unsupported(&'static str),

    #[error("{0}")]
    Failed(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Permission {
    Granted,
    Denied,
}

/// A user-facing notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub title: String,
    pub body: String,
    /// Notifications sharing a tag replace each other.
    pub tag: Option<String>,
}

pub trait Notifier {
    fn request_permission(&mut self) -> Permission;

    /// Best effort; callers log and drop the error.
    fn show(&mut self, notification: &Notification) -> Result<(), CapabilityError>;
}

/// Opaque token for a held wake lock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WakeLockHandle(pub u64);

pub trait WakeLock {
    fn acquire(&mut self) -> Result<WakeLockHandle, CapabilityError>;

    fn release(&mut self, handle: WakeLockHandle);
}

/// Notifier for hosts without notifications.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopNotifier;

impl Notifier for NoopNotifier {
    fn request_permission(&mut self) -> Permission {
        Permission::Denied
    }

    fn show(&mut self, _notification: &Notification) -> Result<(), CapabilityError> {
        Err(CapabilityError::Unsupported("notifications"))
    }
}

/// Wake lock for hosts without one.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopWakeLock;

impl WakeLock for NoopWakeLock {
    fn acquire(&mut self) -> Result<WakeLockHandle, CapabilityError> {
        Err(CapabilityError::Unsupported("wake lock"))
    }

    fn release(&mut self, _handle: WakeLockHandle) {}
}
