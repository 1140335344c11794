// Deadline / cancellation token for long ranking scans.
//
// A Deadline is cheap to clone; clones share the cancellation flag, so a
// caller can hand one clone to the scan and keep another to cancel it.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Default)]
pub struct Deadline {
    expires_at: Option<Instant>,
    cancelled: Arc<AtomicBool>,
}

impl Deadline {
    /// A deadline that only trips on explicit cancellation.
    pub fn never() -> Self {
        Self::default()
    }

    /// Expire `timeout` from now.
    pub fn after(timeout: Duration) -> Self {
        Self::at(Instant::now() + timeout)
    }

    /// Expire at a fixed instant.
    pub fn at(instant: Instant) -> Self {
        Self {
            expires_at: Some(instant),
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Request cancellation. Visible to every clone.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    pub fn is_expired(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
            || self.expires_at.is_some_and(|t| Instant::now() >= t)
    }
}
