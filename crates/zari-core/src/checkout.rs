//! # Checkout Step Machine
//!
//! The four-step checkout wizard.
//!
//! ## States
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │   Closed ──open──► 1 SelectMethod ──► 2 EnterDetails ──► 3 SelectPayment│
//! │     ▲                   ▲    │            ▲    │             ▲    │     │
//! │     │                   └back┘            └back┘             └back┘     │
//! │     │                                                              ▼    │
//! │     ├──────────── complete (order placed) ◄──────────────── 4 Review    │
//! │     │                                                                   │
//! │     └── confirm_exit ◄── ExitConfirm (overlay on any step) ──cancel──►  │
//! │                           back to the step it was raised from           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Guards (forward only)
//! | From | Requires                                                      |
//! |------|---------------------------------------------------------------|
//! | 1→2  | method chosen; delivery also needs emirate and city           |
//! | 2→3  | valid phone and email; delivery also needs street and unit    |
//! | 3→4  | payment chosen (no default)                                   |
//! | 4→✓  | cart not empty, earlier guards still hold                     |
//!
//! Going back never checks anything and never clears fields.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::cart::Cart;
use crate::error::{CheckoutError, ValidationError};
use crate::types::{FulfillmentMethod, GeoPoint, PaymentMethod, Profile};
use crate::validation::{validate_email, validate_phone};

// =============================================================================
// Steps & Phase
// =============================================================================

/// Wizard step, numbered as shown to the shopper.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum CheckoutStep {
    SelectMethod = 1,
    EnterDetails = 2,
    SelectPayment = 3,
    Review = 4,
}

impl CheckoutStep {
    pub const fn number(&self) -> u8 {
        *self as u8
    }

    pub const fn next(&self) -> Option<CheckoutStep> {
        match self {
            CheckoutStep::SelectMethod => Some(CheckoutStep::EnterDetails),
            CheckoutStep::EnterDetails => Some(CheckoutStep::SelectPayment),
            CheckoutStep::SelectPayment => Some(CheckoutStep::Review),
            CheckoutStep::Review => None,
        }
    }

    pub const fn previous(&self) -> Option<CheckoutStep> {
        match self {
            CheckoutStep::SelectMethod => None,
            CheckoutStep::EnterDetails => Some(CheckoutStep::SelectMethod),
            CheckoutStep::SelectPayment => Some(CheckoutStep::EnterDetails),
            CheckoutStep::Review => Some(CheckoutStep::SelectPayment),
        }
    }
}

/// Whether checkout is showing, and where.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(tag = "phase", rename_all = "camelCase")]
pub enum CheckoutPhase {
    #[default]
    Closed,
    Open {
        step: CheckoutStep,
        /// Leave-checkout prompt overlaid on `step`.
        exit_confirm: bool,
    },
}

// =============================================================================
// Form
// =============================================================================

/// Everything the shopper types or picks during checkout.
///
/// Fields are free-form while editing; guards validate them on the way
/// forward.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CheckoutForm {
    pub method: Option<FulfillmentMethod>,
    pub emirate: String,
    pub city: String,
    pub street: String,
    /// Villa / apartment number.
    pub unit: String,
    pub location: Option<GeoPoint>,
    pub phone: String,
    pub email: String,
    pub payment: Option<PaymentMethod>,
    pub is_gift: bool,
    pub gift_note: String,
    pub notes: String,
    /// Copy a delivery address back to the shopper's profile.
    pub save_to_profile: bool,
}

impl CheckoutForm {
    pub fn is_delivery(&self) -> bool {
        self.method == Some(FulfillmentMethod::Delivery)
    }

    /// Fills contact fields, and the address from a saved one.
    ///
    /// A saved address switches the method to delivery, as returning
    /// shoppers mostly reorder to the same place.
    pub fn prefill(&mut self, email: &str, profile: Option<&Profile>) {
        if self.email.trim().is_empty() {
            self.email = email.to_string();
        }

        let Some(profile) = profile else {
            return;
        };

        if self.phone.trim().is_empty() && !profile.phone.is_empty() {
            self.phone = crate::validation::normalize_phone(&profile.phone);
        }

        if profile.has_saved_address() {
            self.method = Some(FulfillmentMethod::Delivery);
            self.emirate = profile.emirate.clone();
            self.city = profile.city.clone();
            self.street = profile.street.clone();
            self.unit = profile.villa.clone();
            self.location = profile.location;
        }
    }
}

/// Form contents after every guard passed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CheckoutDetails {
    pub method: FulfillmentMethod,
    pub emirate: String,
    pub city: String,
    pub street: String,
    pub unit: String,
    pub location: Option<GeoPoint>,
    /// Normalized nine-digit national number.
    pub phone: String,
    pub email: String,
    pub payment: PaymentMethod,
    pub is_gift: bool,
    pub gift_note: Option<String>,
    pub notes: String,
    pub save_to_profile: bool,
}

// =============================================================================
// Guards
// =============================================================================

/// Guard for leaving `step` forward.
pub fn validate_step(form: &CheckoutForm, step: CheckoutStep) -> Result<(), ValidationError> {
    match step {
        CheckoutStep::SelectMethod => {
            let method = form
                .method
                .ok_or_else(|| ValidationError::required("fulfillment method"))?;
            if method == FulfillmentMethod::Delivery {
                require(&form.emirate, "emirate")?;
                require(&form.city, "city")?;
            }
            Ok(())
        }
        CheckoutStep::EnterDetails => {
            validate_phone(&form.phone)?;
            validate_email(&form.email)?;
            if form.is_delivery() {
                require(&form.street, "street")?;
                require(&form.unit, "villa / apartment")?;
            }
            Ok(())
        }
        CheckoutStep::SelectPayment => form
            .payment
            .map(|_| ())
            .ok_or_else(|| ValidationError::required("payment method")),
        CheckoutStep::Review => Ok(()),
    }
}

fn require(value: &str, field: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::required(field));
    }
    Ok(())
}

fn blocked(step: CheckoutStep) -> impl FnOnce(ValidationError) -> CheckoutError {
    move |reason| CheckoutError::StepIncomplete {
        step: step.number(),
        reason,
    }
}

// =============================================================================
// Machine
// =============================================================================

/// Checkout wizard state for one session.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Checkout {
    phase: CheckoutPhase,
    form: CheckoutForm,
}

impl Checkout {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> CheckoutPhase {
        self.phase
    }

    pub fn form(&self) -> &CheckoutForm {
        &self.form
    }

    /// Field edits are allowed at any step.
    pub fn form_mut(&mut self) -> &mut CheckoutForm {
        &mut self.form
    }

    /// Current step, `None` when closed.
    pub fn step(&self) -> Option<CheckoutStep> {
        match self.phase {
            CheckoutPhase::Open { step, .. } => Some(step),
            CheckoutPhase::Closed => None,
        }
    }

    pub fn is_open(&self) -> bool {
        matches!(self.phase, CheckoutPhase::Open { .. })
    }

    /// Shows checkout at step 1. Re-opening keeps the current step.
    pub fn open(&mut self) -> CheckoutStep {
        match self.phase {
            CheckoutPhase::Open { step, .. } => step,
            CheckoutPhase::Closed => {
                self.phase = CheckoutPhase::Open {
                    step: CheckoutStep::SelectMethod,
                    exit_confirm: false,
                };
                CheckoutStep::SelectMethod
            }
        }
    }

    /// Moves one step forward if the current step's guard passes.
    ///
    /// At review there is nowhere further to go; placing the order is a
    /// separate action ([`Checkout::ready_to_submit`]).
    pub fn advance(&mut self) -> Result<CheckoutStep, CheckoutError> {
        let step = self.active_step()?;
        let Some(next) = step.next() else {
            return Ok(step);
        };

        validate_step(&self.form, step).map_err(blocked(step))?;

        self.phase = CheckoutPhase::Open {
            step: next,
            exit_confirm: false,
        };
        Ok(next)
    }

    /// Moves one step back, keeping every entered value.
    pub fn back(&mut self) -> Result<CheckoutStep, CheckoutError> {
        let step = self.active_step()?;
        let previous = step.previous().unwrap_or(step);
        self.phase = CheckoutPhase::Open {
            step: previous,
            exit_confirm: false,
        };
        Ok(previous)
    }

    /// Raises the leave-checkout prompt over the current step.
    pub fn request_exit(&mut self) -> Result<(), CheckoutError> {
        match self.phase {
            CheckoutPhase::Open { step, .. } => {
                self.phase = CheckoutPhase::Open {
                    step,
                    exit_confirm: true,
                };
                Ok(())
            }
            CheckoutPhase::Closed => Err(CheckoutError::NotOpen),
        }
    }

    /// Leaves checkout, discarding the form. The cart is not touched.
    pub fn confirm_exit(&mut self) -> Result<(), CheckoutError> {
        if !self.is_open() {
            return Err(CheckoutError::NotOpen);
        }
        self.reset();
        Ok(())
    }

    /// Dismisses the prompt and returns to the step it was raised from.
    pub fn cancel_exit(&mut self) -> Result<CheckoutStep, CheckoutError> {
        match self.phase {
            CheckoutPhase::Open { step, .. } => {
                self.phase = CheckoutPhase::Open {
                    step,
                    exit_confirm: false,
                };
                Ok(step)
            }
            CheckoutPhase::Closed => Err(CheckoutError::NotOpen),
        }
    }

    /// Final check before an order is written.
    ///
    /// Re-runs every guard, since fields stay editable after their step.
    pub fn ready_to_submit(&self, cart: &Cart) -> Result<CheckoutDetails, CheckoutError> {
        let step = self.active_step()?;
        if step != CheckoutStep::Review {
            return Err(CheckoutError::NotAtReview);
        }

        if cart.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }

        for guard in [
            CheckoutStep::SelectMethod,
            CheckoutStep::EnterDetails,
            CheckoutStep::SelectPayment,
        ] {
            validate_step(&self.form, guard).map_err(blocked(guard))?;
        }

        let form = &self.form;
        let (Some(method), Some(payment)) = (form.method, form.payment) else {
            return Err(CheckoutError::NotAtReview);
        };
        let phone = validate_phone(&form.phone).map_err(blocked(CheckoutStep::EnterDetails))?;
        let email = validate_email(&form.email).map_err(blocked(CheckoutStep::EnterDetails))?;
        let gift_note = form.gift_note.trim();

        Ok(CheckoutDetails {
            method,
            emirate: form.emirate.trim().to_string(),
            city: form.city.trim().to_string(),
            street: form.street.trim().to_string(),
            unit: form.unit.trim().to_string(),
            location: form.location,
            phone,
            email,
            payment,
            is_gift: form.is_gift,
            gift_note: (form.is_gift && !gift_note.is_empty()).then(|| gift_note.to_string()),
            notes: form.notes.trim().to_string(),
            save_to_profile: form.save_to_profile,
        })
    }

    /// Order placed: close and start the next checkout from a blank form.
    pub fn complete(&mut self) {
        self.reset();
    }

    /// Back to the initial state.
    pub fn reset(&mut self) {
        *self = Checkout::default();
    }

    fn active_step(&self) -> Result<CheckoutStep, CheckoutError> {
        match self.phase {
            CheckoutPhase::Open {
                exit_confirm: true, ..
            } => Err(CheckoutError::ExitPending),
            CheckoutPhase::Open { step, .. } => Ok(step),
            CheckoutPhase::Closed => Err(CheckoutError::NotOpen),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::money::Money;
    use crate::types::{Category, Product};

    fn cart_with_item() -> Cart {
        let mut cart = Cart::new();
        let product = Product {
            id: "p-1".to_string(),
            name_en: "Amber Musk".to_string(),
            name_ar: "مسك العنبر".to_string(),
            price: Money::from_units(100),
            image_url: String::new(),
            store_id: "s-1".to_string(),
            category: Category::Musk,
            stock: 4,
        };
        cart.add_item(&product, 1).unwrap();
        cart
    }

    fn at_details(method: FulfillmentMethod) -> Checkout {
        let mut checkout = Checkout::new();
        checkout.open();
        checkout.form_mut().method = Some(method);
        checkout.form_mut().emirate = "Dubai".to_string();
        checkout.form_mut().city = "Deira".to_string();
        checkout.advance().unwrap();
        checkout
    }

    #[test]
    fn test_closed_rejects_navigation() {
        let mut checkout = Checkout::new();
        assert_eq!(checkout.advance(), Err(CheckoutError::NotOpen));
        assert_eq!(checkout.back(), Err(CheckoutError::NotOpen));
        assert_eq!(checkout.request_exit(), Err(CheckoutError::NotOpen));
    }

    #[test]
    fn test_step_one_needs_method_and_area_for_delivery() {
        let mut checkout = Checkout::new();
        checkout.open();

        assert!(matches!(
            checkout.advance(),
            Err(CheckoutError::StepIncomplete { step: 1, .. })
        ));

        checkout.form_mut().method = Some(FulfillmentMethod::Delivery);
        checkout.form_mut().emirate = "Dubai".to_string();
        assert!(checkout.advance().is_err());

        checkout.form_mut().city = "Deira".to_string();
        assert_eq!(checkout.advance(), Ok(CheckoutStep::EnterDetails));
    }

    #[test]
    fn test_pickup_skips_address_fields() {
        let mut checkout = Checkout::new();
        checkout.open();
        checkout.form_mut().method = Some(FulfillmentMethod::Pickup);
        assert_eq!(checkout.advance(), Ok(CheckoutStep::EnterDetails));

        checkout.form_mut().phone = "501234567".to_string();
        checkout.form_mut().email = "guest@zari.ae".to_string();
        assert_eq!(checkout.advance(), Ok(CheckoutStep::SelectPayment));
    }

    #[test]
    fn test_delivery_details_need_street() {
        let mut checkout = at_details(FulfillmentMethod::Delivery);
        checkout.form_mut().phone = "501234567".to_string();
        checkout.form_mut().email = "guest@zari.ae".to_string();
        checkout.form_mut().unit = "Villa 12".to_string();

        let err = checkout.advance().unwrap_err();
        assert_eq!(
            err,
            CheckoutError::StepIncomplete {
                step: 2,
                reason: ValidationError::required("street"),
            }
        );
        assert_eq!(checkout.step(), Some(CheckoutStep::EnterDetails));

        checkout.form_mut().street = "Al Rigga Rd".to_string();
        assert_eq!(checkout.advance(), Ok(CheckoutStep::SelectPayment));
    }

    #[test]
    fn test_details_reject_bad_contact() {
        let mut checkout = at_details(FulfillmentMethod::Pickup);
        checkout.form_mut().phone = "5012".to_string();
        checkout.form_mut().email = "guest@zari.ae".to_string();
        assert!(checkout.advance().is_err());

        checkout.form_mut().phone = "501234567".to_string();
        checkout.form_mut().email = "guest-at-zari".to_string();
        assert!(checkout.advance().is_err());
    }

    #[test]
    fn test_payment_has_no_default() {
        let mut checkout = at_details(FulfillmentMethod::Pickup);
        checkout.form_mut().phone = "501234567".to_string();
        checkout.form_mut().email = "guest@zari.ae".to_string();
        checkout.advance().unwrap();

        assert!(matches!(
            checkout.advance(),
            Err(CheckoutError::StepIncomplete { step: 3, .. })
        ));
        checkout.form_mut().payment = Some(PaymentMethod::Cash);
        assert_eq!(checkout.advance(), Ok(CheckoutStep::Review));
        // Nothing past review
        assert_eq!(checkout.advance(), Ok(CheckoutStep::Review));
    }

    #[test]
    fn test_back_keeps_values() {
        let mut checkout = at_details(FulfillmentMethod::Delivery);
        checkout.form_mut().street = "Al Rigga Rd".to_string();

        assert_eq!(checkout.back(), Ok(CheckoutStep::SelectMethod));
        assert_eq!(checkout.back(), Ok(CheckoutStep::SelectMethod));
        assert_eq!(checkout.form().street, "Al Rigga Rd");
        assert_eq!(checkout.form().city, "Deira");
    }

    #[test]
    fn test_exit_confirm_flow() {
        let mut checkout = at_details(FulfillmentMethod::Delivery);

        checkout.request_exit().unwrap();
        assert_eq!(checkout.advance(), Err(CheckoutError::ExitPending));
        assert_eq!(checkout.cancel_exit(), Ok(CheckoutStep::EnterDetails));
        assert_eq!(checkout.form().city, "Deira");

        checkout.request_exit().unwrap();
        checkout.confirm_exit().unwrap();
        assert_eq!(checkout.phase(), CheckoutPhase::Closed);
        assert_eq!(checkout.form(), &CheckoutForm::default());
    }

    #[test]
    fn test_confirm_exit_when_closed() {
        let mut checkout = Checkout::new();
        assert_eq!(checkout.confirm_exit(), Err(CheckoutError::NotOpen));
        assert_eq!(checkout.cancel_exit(), Err(CheckoutError::NotOpen));
    }

    #[test]
    fn test_ready_to_submit() {
        let mut checkout = at_details(FulfillmentMethod::Pickup);
        checkout.form_mut().phone = "+971 50 123 4567".to_string();
        checkout.form_mut().email = " guest@zari.ae ".to_string();
        checkout.advance().unwrap();
        checkout.form_mut().payment = Some(PaymentMethod::Card);

        assert_eq!(
            checkout.ready_to_submit(&cart_with_item()),
            Err(CheckoutError::NotAtReview)
        );
        checkout.advance().unwrap();

        assert_eq!(
            checkout.ready_to_submit(&Cart::new()),
            Err(CheckoutError::EmptyCart)
        );

        let details = checkout.ready_to_submit(&cart_with_item()).unwrap();
        assert_eq!(details.phone, "501234567");
        assert_eq!(details.email, "guest@zari.ae");
        assert_eq!(details.method, FulfillmentMethod::Pickup);
        assert_eq!(details.gift_note, None);

        checkout.complete();
        assert!(!checkout.is_open());
    }

    #[test]
    fn test_ready_to_submit_rechecks_edited_fields() {
        let mut checkout = at_details(FulfillmentMethod::Pickup);
        checkout.form_mut().phone = "501234567".to_string();
        checkout.form_mut().email = "guest@zari.ae".to_string();
        checkout.advance().unwrap();
        checkout.form_mut().payment = Some(PaymentMethod::Cash);
        checkout.advance().unwrap();

        checkout.form_mut().email.clear();
        assert!(matches!(
            checkout.ready_to_submit(&cart_with_item()),
            Err(CheckoutError::StepIncomplete { step: 2, .. })
        ));
    }

    #[test]
    fn test_prefill_from_profile() {
        let profile = Profile {
            id: "u-1".to_string(),
            phone: "971501234567".to_string(),
            emirate: "Ajman".to_string(),
            city: "Al Nuaimiya".to_string(),
            street: "Street 4".to_string(),
            villa: "Apt 9".to_string(),
            ..Profile::default()
        };

        let mut form = CheckoutForm::default();
        form.prefill("layla@zari.ae", Some(&profile));

        assert_eq!(form.email, "layla@zari.ae");
        assert_eq!(form.phone, "501234567");
        assert_eq!(form.method, Some(FulfillmentMethod::Delivery));
        assert_eq!(form.unit, "Apt 9");
    }
}
