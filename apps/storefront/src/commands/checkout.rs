//! # Checkout Commands
//!
//! The four-step checkout and order submission.
//!
//! ## Submission Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    submit_order                                         │
//! │                                                                         │
//! │  1. Claim the submission slot ────── busy? SubmissionInFlight          │
//! │  2. Re-run every step guard ──────── at review, cart not empty         │
//! │  3. Price the cart (coupon, delivery fee, gift fee)                    │
//! │  4. Assemble header + lines (names and prices frozen)                  │
//! │  5. Write header, lines, coupon use ── one transaction                 │
//! │        │                                                                │
//! │        ├── coupon ran out ─► drop the coupon, nothing written          │
//! │        └── any other failure ─► generic message, nothing written       │
//! │  6. Copy the address to the profile (opt-in; failure only logged)      │
//! │  7. Clear cart and checkout, return the receipt                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use zari_core::{
    AppliedCoupon, Cart, Checkout, CheckoutError, CheckoutForm, CheckoutPhase, CheckoutStep,
    DeliveryLocations, NewOrder, OrderContext, PriceBreakdown, PricingOptions, Receipt,
    SavedAddress,
};

use crate::error::ApiResult;
use crate::services::{Services, StoreError};
use crate::state::{CartSession, CartState, CheckoutState, ConfigState, SessionState};

/// Everything the checkout screens render.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutView {
    pub phase: CheckoutPhase,
    pub step: Option<CheckoutStep>,
    pub form: CheckoutForm,
    pub pricing: PriceBreakdown,
    pub coupon: Option<AppliedCoupon>,
    /// Emirates with a delivery fee, sorted.
    pub emirates: Vec<String>,
    /// Cities of the selected emirate, sorted.
    pub cities: Vec<String>,
    pub submitting: bool,
}

fn price(
    config: &ConfigState,
    session: &CartSession,
    form: &CheckoutForm,
    locations: &DeliveryLocations,
) -> PriceBreakdown {
    PriceBreakdown::compute(
        session.cart.lines(),
        PricingOptions {
            discount: session.coupon.as_ref().map(AppliedCoupon::rate),
            delivery_fee: locations.fee_for_method(
                form.method,
                form.emirate.trim(),
                form.city.trim(),
            ),
            gift_fee: form.is_gift.then(|| config.gift_fee()),
        },
    )
}

fn view(config: &ConfigState, cart: &CartState, checkout: &CheckoutState) -> CheckoutView {
    let session = cart.snapshot();
    let locations = checkout.locations();
    let (phase, step, form) = checkout.with_checkout(|c| (c.phase(), c.step(), c.form().clone()));

    CheckoutView {
        pricing: price(config, &session, &form, &locations),
        coupon: session.coupon,
        emirates: locations.emirates().into_iter().map(str::to_string).collect(),
        cities: locations
            .cities(form.emirate.trim())
            .into_iter()
            .map(str::to_string)
            .collect(),
        submitting: checkout.is_submitting(),
        phase,
        step,
        form,
    }
}

/// Opens checkout at step 1.
///
/// A fresh checkout is pre-filled from the signed-in shopper: email from the
/// account, phone and address from the saved profile. Re-opening keeps the
/// current step and form.
///
/// ## Errors
/// - `EmptyCart` when there is nothing to buy
/// - delivery locations could not be loaded
pub async fn open_checkout(
    services: &Services,
    config: &ConfigState,
    session: &SessionState,
    cart: &CartState,
    checkout: &CheckoutState,
) -> ApiResult<CheckoutView> {
    debug!("open_checkout command");
    if cart.with_cart(Cart::is_empty) {
        return Err(CheckoutError::EmptyCart.into());
    }

    match services.auth.current_user().await {
        Ok(user) => session.set_user(user),
        Err(e) => warn!(error = %e, "Could not read the signed-in user"),
    }
    let user = session.user();

    let profile = match &user {
        Some(user) => services
            .profiles
            .profile(&user.id)
            .await
            .unwrap_or_else(|e| {
                warn!(user_id = %user.id, error = %e, "Could not load profile for prefill");
                None
            }),
        None => None,
    };

    let locations = services.locations.list_locations().await?;
    checkout.set_locations(DeliveryLocations::new(locations));

    checkout.with_checkout_mut(|c| {
        if !c.is_open() {
            c.open();
            let email = user.as_ref().map(|u| u.email.as_str()).unwrap_or_default();
            c.form_mut().prefill(email, profile.as_ref());
        }
    });

    Ok(view(config, cart, checkout))
}

/// Replaces the form contents. Allowed at any step; guards run on advance.
pub fn update_checkout_form(
    config: &ConfigState,
    cart: &CartState,
    checkout: &CheckoutState,
    form: CheckoutForm,
) -> ApiResult<CheckoutView> {
    debug!(method = ?form.method, "update_checkout_form command");
    checkout.with_checkout_mut(|c| {
        if !c.is_open() {
            return Err(CheckoutError::NotOpen);
        }
        *c.form_mut() = form;
        Ok(())
    })?;
    Ok(view(config, cart, checkout))
}

/// Next step, if the current step's fields pass.
pub fn advance_checkout(
    config: &ConfigState,
    cart: &CartState,
    checkout: &CheckoutState,
) -> ApiResult<CheckoutView> {
    let step = checkout.with_checkout_mut(Checkout::advance)?;
    debug!(step = step.number(), "advance_checkout command");
    Ok(view(config, cart, checkout))
}

pub fn checkout_back(
    config: &ConfigState,
    cart: &CartState,
    checkout: &CheckoutState,
) -> ApiResult<CheckoutView> {
    let step = checkout.with_checkout_mut(Checkout::back)?;
    debug!(step = step.number(), "checkout_back command");
    Ok(view(config, cart, checkout))
}

/// Shows the leave-checkout prompt.
pub fn request_checkout_exit(
    config: &ConfigState,
    cart: &CartState,
    checkout: &CheckoutState,
) -> ApiResult<CheckoutView> {
    debug!("request_checkout_exit command");
    checkout.with_checkout_mut(Checkout::request_exit)?;
    Ok(view(config, cart, checkout))
}

/// Leaves checkout. The form is discarded; the cart is kept.
pub fn confirm_checkout_exit(
    config: &ConfigState,
    cart: &CartState,
    checkout: &CheckoutState,
) -> ApiResult<CheckoutView> {
    debug!("confirm_checkout_exit command");
    checkout.with_checkout_mut(Checkout::confirm_exit)?;
    Ok(view(config, cart, checkout))
}

pub fn cancel_checkout_exit(
    config: &ConfigState,
    cart: &CartState,
    checkout: &CheckoutState,
) -> ApiResult<CheckoutView> {
    debug!("cancel_checkout_exit command");
    checkout.with_checkout_mut(Checkout::cancel_exit)?;
    Ok(view(config, cart, checkout))
}

/// Current step, form and price summary.
pub fn checkout_summary(
    config: &ConfigState,
    cart: &CartState,
    checkout: &CheckoutState,
) -> CheckoutView {
    debug!("checkout_summary command");
    view(config, cart, checkout)
}

/// Places the order from the review step.
///
/// Only one submission runs at a time per session; a second call while the
/// first is in flight is refused rather than queued. Nothing is retried.
///
/// ## Returns
/// The receipt of the stored order. The ordered lines leave the cart, the
/// coupon is dropped and checkout closes.
pub async fn submit_order(
    services: &Services,
    config: &ConfigState,
    session: &SessionState,
    cart: &CartState,
    checkout: &CheckoutState,
) -> ApiResult<Receipt> {
    debug!("submit_order command");
    let _flight = checkout.begin_submission()?;

    let snapshot = cart.snapshot();
    let details = checkout.with_checkout(|c| c.ready_to_submit(&snapshot.cart))?;
    let locations = checkout.locations();

    let pricing = PriceBreakdown::compute(
        snapshot.cart.lines(),
        PricingOptions {
            discount: snapshot.coupon.as_ref().map(AppliedCoupon::rate),
            delivery_fee: locations.fee_for_method(
                Some(details.method),
                &details.emirate,
                &details.city,
            ),
            gift_fee: details.is_gift.then(|| config.gift_fee()),
        },
    );

    let user = session.user();
    let new_order = NewOrder::assemble(
        &details,
        &snapshot.cart,
        &pricing,
        snapshot.coupon.as_ref(),
        OrderContext {
            user_id: user.as_ref().map(|u| u.id.as_str()),
            language: session.language(),
            pickup_label: &config.store.pickup_label,
        },
    )?;

    let (order, items) = match services.orders.place_order(&new_order).await {
        Ok(placed) => placed,
        Err(StoreError::CouponUnavailable(code)) => {
            // The shopper can resubmit at full price.
            cart.set_coupon(None);
            return Err(StoreError::CouponUnavailable(code).into());
        }
        Err(e) => return Err(e.into()),
    };

    if let (Some(user), Some(address)) = (&user, SavedAddress::from_details(&details)) {
        if let Err(e) = services.profiles.save_address(&user.id, &address).await {
            warn!(
                order_id = %order.id,
                user_id = %user.id,
                error = %e,
                "Order placed but saved address not updated"
            );
        }
    }

    cart.settle(&snapshot.cart);
    checkout.with_checkout_mut(Checkout::complete);

    info!(
        order_id = %order.id,
        total = %order.total,
        fulfillment = order.fulfillment.as_str(),
        coupon = ?order.coupon_code,
        "Order submitted"
    );
    Ok(Receipt::new(&config.store.name, &order, &items))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::fixtures::{perfume, seed_catalog, shopper};
    use crate::error::ErrorCode;
    use crate::services::testing::{sqlite_services_as, MockServices};
    use chrono::Utc;
    use zari_core::{
        DeliveryLocation, FulfillmentMethod, GeoPoint, Language, Money, Order, OrderStatus,
        PaymentMethod, Profile,
    };
    use zari_db::NewCoupon;

    struct Session {
        config: ConfigState,
        session: SessionState,
        cart: CartState,
        checkout: CheckoutState,
    }

    impl Session {
        fn new() -> Self {
            Session {
                config: ConfigState::default(),
                session: SessionState::new(Language::En),
                cart: CartState::default(),
                checkout: CheckoutState::new(),
            }
        }

        fn with_item(self, price_units: i64, quantity: u32) -> Self {
            self.cart
                .with_cart_mut(|c| c.add_item(&perfume("p-1", price_units, 10), quantity))
                .unwrap();
            self
        }

        async fn open(&self, services: &Services) -> CheckoutView {
            open_checkout(services, &self.config, &self.session, &self.cart, &self.checkout)
                .await
                .unwrap()
        }

        fn edit(&self, f: impl FnOnce(&mut CheckoutForm)) -> CheckoutView {
            let mut form = self.checkout.with_checkout(|c| c.form().clone());
            f(&mut form);
            update_checkout_form(&self.config, &self.cart, &self.checkout, form).unwrap()
        }

        fn advance(&self) -> ApiResult<CheckoutView> {
            advance_checkout(&self.config, &self.cart, &self.checkout)
        }

        async fn submit(&self, services: &Services) -> ApiResult<Receipt> {
            submit_order(services, &self.config, &self.session, &self.cart, &self.checkout).await
        }

        /// Pickup, cash, contact filled in, at review.
        fn to_review_pickup(&self) {
            self.edit(|f| {
                f.method = Some(FulfillmentMethod::Pickup);
                f.phone = "050 123 4567".to_string();
                f.email = "guest@example.com".to_string();
                f.payment = Some(PaymentMethod::Cash);
            });
            for _ in 0..3 {
                self.advance().unwrap();
            }
        }
    }

    fn location(emirate: &str, city: &str, fee: i64) -> DeliveryLocation {
        DeliveryLocation {
            id: format!("{emirate}-{city}"),
            emirate: emirate.to_string(),
            city: city.to_string(),
            cost: Money::from_units(fee),
        }
    }

    fn mocks_for_open(user: Option<zari_core::AuthUser>, profile: Option<Profile>) -> MockServices {
        let mut mocks = MockServices::new();
        mocks
            .auth
            .expect_current_user()
            .returning(move || Ok(user.clone()));
        mocks
            .profiles
            .expect_profile()
            .returning(move |_| Ok(profile.clone()));
        mocks.locations.expect_list_locations().returning(|| {
            Ok(vec![
                location("Dubai", "Marina", 20),
                location("Dubai", "Deira", 15),
                location("Sharjah", "Al Nahda", 25),
            ])
        });
        mocks
    }

    fn placed(new: &NewOrder) -> Order {
        Order {
            id: "order-1".to_string(),
            user_id: new.user_id.clone(),
            customer_email: new.customer_email.clone(),
            customer_phone: new.customer_phone.clone(),
            total: new.total,
            payment_method: new.payment_method,
            fulfillment: new.fulfillment,
            address: new.address.clone(),
            delivery_fee: new.delivery_fee,
            discount: new.discount,
            gift_fee: new.gift_fee,
            is_gift: new.is_gift,
            gift_note: new.gift_note.clone(),
            notes: new.notes.clone(),
            coupon_code: new.coupon_code.clone(),
            status: new.status,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_open_requires_items() {
        let services = MockServices::new().build();
        let s = Session::new();
        let err = open_checkout(&services, &s.config, &s.session, &s.cart, &s.checkout)
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::CartError);
        assert!(!s.checkout.with_checkout(Checkout::is_open));
    }

    #[tokio::test]
    async fn test_open_prefills_from_profile() {
        let profile = Profile {
            id: "user-1".to_string(),
            phone: "501234567".to_string(),
            emirate: "Dubai".to_string(),
            city: "Marina".to_string(),
            street: "Al Sufouh".to_string(),
            villa: "12".to_string(),
            ..Profile::default()
        };
        let services = mocks_for_open(Some(shopper()), Some(profile)).build();
        let s = Session::new().with_item(100, 1);

        let view = s.open(&services).await;
        assert_eq!(view.step, Some(CheckoutStep::SelectMethod));
        assert_eq!(view.form.email, "layla@example.com");
        assert_eq!(view.form.phone, "501234567");
        assert_eq!(view.form.method, Some(FulfillmentMethod::Delivery));
        assert_eq!(view.pricing.delivery_fee, Money::from_units(20));
        assert_eq!(view.emirates, vec!["Dubai", "Sharjah"]);
        assert_eq!(view.cities, vec!["Deira", "Marina"]);
        assert_eq!(s.session.user(), Some(shopper()));
    }

    #[tokio::test]
    async fn test_guards_block_advance() {
        let services = mocks_for_open(None, None).build();
        let s = Session::new().with_item(100, 1);
        s.open(&services).await;

        let err = s.advance().unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);

        s.edit(|f| f.method = Some(FulfillmentMethod::Delivery));
        assert!(s.advance().is_err());

        s.edit(|f| {
            f.emirate = "Dubai".to_string();
            f.city = "Deira".to_string();
        });
        let view = s.advance().unwrap();
        assert_eq!(view.step, Some(CheckoutStep::EnterDetails));
        assert_eq!(view.pricing.total, Money::from_units(115));

        s.edit(|f| f.phone = "1234".to_string());
        assert!(s.advance().is_err());
        assert_eq!(
            checkout_summary(&s.config, &s.cart, &s.checkout).step,
            Some(CheckoutStep::EnterDetails)
        );
    }

    #[tokio::test]
    async fn test_exit_prompt_keeps_cart() {
        let services = mocks_for_open(None, None).build();
        let s = Session::new().with_item(100, 1);
        s.open(&services).await;

        let view = request_checkout_exit(&s.config, &s.cart, &s.checkout).unwrap();
        assert!(matches!(view.phase, CheckoutPhase::Open { exit_confirm: true, .. }));
        let err = s.advance().unwrap_err();
        assert_eq!(err.code, ErrorCode::CheckoutError);

        let view = cancel_checkout_exit(&s.config, &s.cart, &s.checkout).unwrap();
        assert_eq!(view.step, Some(CheckoutStep::SelectMethod));

        request_checkout_exit(&s.config, &s.cart, &s.checkout).unwrap();
        let view = confirm_checkout_exit(&s.config, &s.cart, &s.checkout).unwrap();
        assert_eq!(view.phase, CheckoutPhase::Closed);
        assert_eq!(s.cart.with_cart(Cart::item_count), 1);
    }

    #[tokio::test]
    async fn test_pickup_order_with_coupon_end_to_end() {
        let (services, db) = sqlite_services_as(None).await;
        let product = perfume("3f2504e0-4f89-41d3-9a0c-0305e82c3301", 100, 5);
        seed_catalog(&db, std::slice::from_ref(&product)).await;
        db.coupons()
            .insert(&NewCoupon {
                code: "SAVE10".to_string(),
                discount_percent: 10,
                usage_limit: 100,
            })
            .await
            .unwrap();

        let s = Session::new();
        crate::commands::cart::add_to_cart(&services, &s.cart, product.id.clone(), Some(1))
            .await
            .unwrap();
        crate::commands::coupon::apply_coupon(&services, &s.cart, "save10".to_string())
            .await
            .unwrap();

        s.open(&services).await;
        s.to_review_pickup();
        let receipt = s.submit(&services).await.unwrap();

        assert_eq!(receipt.store_name, "Zari");
        assert_eq!(receipt.address, "Pickup from Store");
        assert_eq!(receipt.delivery_fee, Money::zero());
        assert_eq!(receipt.discount, Money::from_units(10));
        assert_eq!(receipt.total, Money::from_units(90));
        assert_eq!(receipt.customer_phone, "+971 501234567");
        assert_eq!(receipt.lines.len(), 1);

        let (order, items) = db.orders().get_with_items(&receipt.order_id).await.unwrap().unwrap();
        assert_eq!(order.status, OrderStatus::Waiting);
        assert_eq!(order.user_id, None);
        assert_eq!(items[0].product_id.as_deref(), Some(product.id.as_str()));
        let coupon = db.coupons().find_active_by_code("SAVE10").await.unwrap().unwrap();
        assert_eq!(coupon.times_used, 1);

        assert!(s.cart.with_cart(Cart::is_empty));
        assert!(s.cart.coupon().is_none());
        assert_eq!(s.checkout.with_checkout(Checkout::phase), CheckoutPhase::Closed);
    }

    #[tokio::test]
    async fn test_delivery_gift_order_saves_address() {
        let (services, db) = sqlite_services_as(Some(shopper())).await;
        seed_catalog(&db, &[perfume("p-1", 250, 5)]).await;
        db.locations()
            .insert("Dubai", "Marina", Money::from_units(20))
            .await
            .unwrap();

        let s = Session::new();
        crate::commands::cart::add_to_cart(&services, &s.cart, "p-1".to_string(), Some(2))
            .await
            .unwrap();
        s.open(&services).await;
        s.edit(|f| {
            f.method = Some(FulfillmentMethod::Delivery);
            f.emirate = "Dubai".to_string();
            f.city = "Marina".to_string();
            f.street = "King Salman St".to_string();
            f.unit = "Apt 1203".to_string();
            f.location = Some(GeoPoint { lat: 25.08, lng: 55.14 });
            f.phone = "+971 50 765 4321".to_string();
            f.payment = Some(PaymentMethod::Card);
            f.is_gift = true;
            f.gift_note = "  Happy Eid  ".to_string();
            f.save_to_profile = true;
        });
        for _ in 0..3 {
            s.advance().unwrap();
        }
        let receipt = s.submit(&services).await.unwrap();

        assert_eq!(receipt.address, "Dubai, Marina, King Salman St, Villa/Apt: Apt 1203");
        assert_eq!(receipt.total, Money::from_units(530));
        assert_eq!(receipt.gift_fee, Money::from_units(10));
        assert_eq!(receipt.gift_note.as_deref(), Some("Happy Eid"));
        assert_eq!(
            receipt.map_link.as_deref(),
            Some("https://www.google.com/maps?q=25.08,55.14")
        );
        assert_eq!(receipt.customer_email, "layla@example.com");

        let profile = db.profiles().get("user-1").await.unwrap().unwrap();
        assert_eq!(profile.street, "King Salman St");
        assert_eq!(profile.villa, "Apt 1203");
        let history = db.orders().list_for_user("user-1").await.unwrap();
        assert_eq!(history.len(), 1);
    }

    #[tokio::test]
    async fn test_coupon_race_drops_coupon_and_keeps_cart() {
        let mut mocks = mocks_for_open(None, None);
        mocks
            .orders
            .expect_place_order()
            .times(1)
            .returning(|_| Err(StoreError::CouponUnavailable("SAVE10".to_string())));
        let services = mocks.build();

        let s = Session::new().with_item(100, 1);
        s.cart.set_coupon(Some(AppliedCoupon {
            code: "SAVE10".to_string(),
            discount_percent: 10,
        }));
        s.open(&services).await;
        s.to_review_pickup();

        let err = s.submit(&services).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::CouponInvalid);
        assert_eq!(err.message, "This coupon has expired");
        assert!(s.cart.coupon().is_none());
        assert_eq!(s.cart.with_cart(Cart::item_count), 1);
        assert_eq!(s.checkout.with_checkout(Checkout::step), Some(CheckoutStep::Review));
        assert!(!s.checkout.is_submitting());
    }

    #[tokio::test]
    async fn test_failed_write_is_generic_and_keeps_state() {
        let mut mocks = mocks_for_open(None, None);
        mocks
            .orders
            .expect_place_order()
            .returning(|_| Err(StoreError::unavailable("database", "connection reset")));
        let services = mocks.build();

        let s = Session::new().with_item(100, 1);
        s.open(&services).await;
        s.to_review_pickup();

        let err = s.submit(&services).await.unwrap_err();
        assert_eq!(err.message, crate::error::GENERIC_FAILURE);
        assert_eq!(s.cart.with_cart(Cart::item_count), 1);
    }

    #[tokio::test]
    async fn test_profile_failure_does_not_fail_order() {
        let mut mocks = mocks_for_open(Some(shopper()), None);
        mocks
            .orders
            .expect_place_order()
            .returning(|new| Ok((placed(new), Vec::new())));
        mocks
            .profiles
            .expect_save_address()
            .times(1)
            .returning(|_, _| Err(StoreError::unavailable("database", "locked")));
        let services = mocks.build();

        let s = Session::new().with_item(100, 1);
        s.open(&services).await;
        s.edit(|f| {
            f.method = Some(FulfillmentMethod::Delivery);
            f.emirate = "Sharjah".to_string();
            f.city = "Al Nahda".to_string();
            f.street = "Street 5".to_string();
            f.unit = "Villa 9".to_string();
            f.phone = "0501234567".to_string();
            f.payment = Some(PaymentMethod::Cash);
            f.save_to_profile = true;
        });
        for _ in 0..3 {
            s.advance().unwrap();
        }

        let receipt = s.submit(&services).await.unwrap();
        assert_eq!(receipt.total, Money::from_units(125));
        assert!(s.cart.with_cart(Cart::is_empty));
    }

    #[tokio::test]
    async fn test_item_added_during_submit_stays_in_cart() {
        let s = Session::new().with_item(100, 1);
        let live = s.cart.clone();
        let mut mocks = mocks_for_open(None, None);
        mocks.orders.expect_place_order().returning(move |new| {
            live.with_cart_mut(|c| c.add_item(&perfume("p-2", 50, 5), 1))
                .unwrap();
            Ok((placed(new), Vec::new()))
        });
        let services = mocks.build();
        s.open(&services).await;
        s.to_review_pickup();

        let receipt = s.submit(&services).await.unwrap();
        assert_eq!(receipt.total, Money::from_units(100));
        assert_eq!(s.cart.with_cart(Cart::item_count), 1);
        assert!(s.cart.with_cart(|c| c.get("p-2").is_some()));
        assert!(s.cart.with_cart(|c| c.get("p-1").is_none()));
    }

    #[tokio::test]
    async fn test_submission_is_single_flight() {
        let services = mocks_for_open(None, None).build();
        let s = Session::new().with_item(100, 1);
        s.open(&services).await;
        s.to_review_pickup();

        let _running = s.checkout.begin_submission().unwrap();
        let err = s.submit(&services).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::CheckoutError);
        assert_eq!(err.message, "An order is already being placed");
    }

    #[tokio::test]
    async fn test_submit_only_from_review() {
        let services = mocks_for_open(None, None).build();
        let s = Session::new().with_item(100, 1);
        s.open(&services).await;

        let err = s.submit(&services).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::CheckoutError);
        assert!(!s.checkout.is_submitting());
    }
}
