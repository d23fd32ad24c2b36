//! # Checkout State
//!
//! The step machine for the current session, the delivery fee table it
//! prices against, and the submission guard.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use zari_core::{Checkout, CheckoutError, DeliveryLocations};

use super::flight::{FlightGuard, SingleFlight};

#[derive(Debug, Clone, Default)]
pub struct CheckoutState {
    checkout: Arc<Mutex<Checkout>>,
    locations: Arc<Mutex<DeliveryLocations>>,
    submission: SingleFlight,
}

impl CheckoutState {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Checkout> {
        self.checkout.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn with_checkout<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&Checkout) -> R,
    {
        f(&self.lock())
    }

    pub fn with_checkout_mut<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut Checkout) -> R,
    {
        f(&mut self.lock())
    }

    /// Fee table loaded when checkout opened.
    pub fn locations(&self) -> DeliveryLocations {
        self.locations
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn set_locations(&self, locations: DeliveryLocations) {
        *self.locations.lock().unwrap_or_else(PoisonError::into_inner) = locations;
    }

    /// Claims the submission slot for this session.
    ///
    /// ## Errors
    /// `SubmissionInFlight` while an earlier submission is still running.
    pub fn begin_submission(&self) -> Result<FlightGuard, CheckoutError> {
        self.submission
            .begin()
            .ok_or(CheckoutError::SubmissionInFlight)
    }

    pub fn is_submitting(&self) -> bool {
        self.submission.in_flight()
    }

    /// Closes checkout and forgets the form and fee table.
    ///
    /// A submission still running is let go: its guard no longer holds the
    /// slot, so a new submission may start at once.
    pub fn reset(&self) {
        self.lock().reset();
        self.set_locations(DeliveryLocations::default());
        self.submission.abandon();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_one_submission_at_a_time() {
        let state = CheckoutState::new();
        let guard = state.begin_submission().unwrap();
        assert_eq!(
            state.begin_submission().unwrap_err(),
            CheckoutError::SubmissionInFlight
        );
        drop(guard);
        assert!(state.begin_submission().is_ok());
    }

    #[test]
    fn test_checkout_edits_persist() {
        let state = CheckoutState::new();
        state.with_checkout_mut(|c| {
            c.open();
            c.form_mut().email = "a@b.co".to_string();
        });
        assert!(state.with_checkout(Checkout::is_open));
        assert_eq!(state.with_checkout(|c| c.form().email.clone()), "a@b.co");

        state.reset();
        assert!(!state.with_checkout(Checkout::is_open));
        assert!(state.with_checkout(|c| c.form().email.is_empty()));
    }

    #[test]
    fn test_reset_frees_submission_slot() {
        let state = CheckoutState::new();
        let earlier = state.begin_submission().unwrap();

        state.reset();
        assert!(!state.is_submitting());
        let current = state.begin_submission().unwrap();

        // The earlier submission finishing must not end the current one.
        drop(earlier);
        assert!(state.is_submitting());
        drop(current);
        assert!(!state.is_submitting());
    }
}
