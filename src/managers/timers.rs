//! Caller-driven timers.
//!
//! Nothing here sleeps. Each timer stores the epoch-millisecond deadline it is
//! waiting for, and the owner polls it with the current time.

/// Trailing-edge debounce with a single pending slot.
///
/// Scheduling while a call is pending replaces it and restarts the delay, so
/// only the most recent payload fires. The slot is not keyed: a burst of calls
/// for different payloads collapses into the last one.
#[derive(Debug, Clone)]
pub struct Debouncer<T> {
    delay_ms: i64,
    pending: Option<(i64, T)>,
}

impl<T> Debouncer<T> {
    pub fn new(delay_ms: i64) -> Self {
        Self {
            delay_ms,
            pending: None,
        }
    }

    /// Replaces any pending payload. Returns true if one was superseded.
    pub fn schedule(&mut self, payload: T, now: i64) -> bool {
        self.pending.replace((now + self.delay_ms, payload)).is_some()
    }

    /// Takes the payload once its deadline has passed.
    pub fn take_due(&mut self, now: i64) -> Option<T> {
        match &self.pending {
            Some((due, _)) if *due <= now => self.pending.take().map(|(_, payload)| payload),
            _ => None,
        }
    }

    pub fn cancel(&mut self) -> Option<T> {
        self.pending.take().map(|(_, payload)| payload)
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn due_at(&self) -> Option<i64> {
        self.pending.as_ref().map(|(due, _)| *due)
    }

    pub fn pending(&self) -> Option<&T> {
        self.pending.as_ref().map(|(_, payload)| payload)
    }
}

/// A repeating deadline whose interval may change between runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Periodic {
    interval_ms: i64,
    next_due: i64,
}

impl Periodic {
    /// First run is one interval after `now`.
    pub fn starting_at(now: i64, interval_ms: i64) -> Self {
        Self {
            interval_ms,
            next_due: now + interval_ms,
        }
    }

    pub fn is_due(&self, now: i64) -> bool {
        now >= self.next_due
    }

    /// Marks a run at `now` and schedules the next one.
    pub fn reschedule(&mut self, now: i64, interval_ms: i64) {
        self.interval_ms = interval_ms;
        self.next_due = now + interval_ms;
    }

    /// Runs once if due, keeping the current interval.
    pub fn fire(&mut self, now: i64) -> bool {
        if !self.is_due(now) {
            return false;
        }
        self.next_due = now + self.interval_ms;
        true
    }

    pub fn next_due(&self) -> i64 {
        self.next_due
    }

    pub fn interval_ms(&self) -> i64 {
        self.interval_ms
    }
}
