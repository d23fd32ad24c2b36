//! Single-flight guard for order submission.
//!
//! A flight is identified by a token. The guard only clears the slot if the
//! slot still holds its own token, so a guard dropped late cannot end a
//! newer flight.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

#[derive(Debug, Default)]
struct Slot {
    active: Mutex<Option<u64>>,
    next_token: AtomicU64,
}

/// At most one flight at a time.
#[derive(Debug, Clone, Default)]
pub struct SingleFlight {
    slot: Arc<Slot>,
}

impl SingleFlight {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a flight, or returns `None` while another is running.
    pub fn begin(&self) -> Option<FlightGuard> {
        let mut active = self
            .slot
            .active
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if active.is_some() {
            return None;
        }
        let token = self.slot.next_token.fetch_add(1, Ordering::Relaxed);
        *active = Some(token);
        Some(FlightGuard {
            slot: Arc::clone(&self.slot),
            token,
        })
    }

    pub fn in_flight(&self) -> bool {
        self.slot
            .active
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    /// Forgets the running flight, if any. Its guard becomes stale.
    pub fn abandon(&self) {
        *self
            .slot
            .active
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = None;
    }
}

/// Ends its flight when dropped.
#[derive(Debug)]
pub struct FlightGuard {
    slot: Arc<Slot>,
    token: u64,
}

impl Drop for FlightGuard {
    fn drop(&mut self) {
        let mut active = self
            .slot
            .active
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if *active == Some(self.token) {
            *active = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_flight_refused_until_first_ends() {
        let flight = SingleFlight::new();
        let guard = flight.begin().unwrap();
        assert!(flight.in_flight());
        assert!(flight.begin().is_none());

        drop(guard);
        assert!(!flight.in_flight());
        assert!(flight.begin().is_some());
    }

    #[test]
    fn test_stale_guard_does_not_end_newer_flight() {
        let flight = SingleFlight::new();
        let stale = flight.begin().unwrap();
        flight.abandon();

        let current = flight.begin().unwrap();
        assert_ne!(stale.token, current.token);

        drop(stale);
        assert!(flight.in_flight());
        drop(current);
        assert!(!flight.in_flight());
    }
}
