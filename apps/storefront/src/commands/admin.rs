//! # Back Office Commands
//!
//! Order fulfilment, coupons, delivery fees, product media and the
//! newsletter broadcast.
//!
//! ## Order Status Changes
//! ```text
//! waiting ──► prepared ──► shipped ──► delivered (final)
//!    ▲ │         ▲ │          ▲ │
//!    │ ▼         │ ▼          │ ▼
//!    └─┴──────── canceled ────┴─┘
//! ```
//! Staff may jump between any two statuses until the order is delivered,
//! including reopening a canceled one. The write is
//! conditional on the status read, so two staff members cannot both move
//! the same order.

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use zari_core::validation::{validate_coupon_code, validate_discount_percent, validate_usage_limit};
use zari_core::{Coupon, CoreError, DeliveryLocation, Money, Order, OrderStatus, Product};
use zari_db::NewCoupon;

use crate::error::{ApiError, ApiResult};
use crate::services::email::EmailVars;
use crate::services::Services;
use crate::state::ConfigState;

// =============================================================================
// Orders
// =============================================================================

/// Every order newest first, optionally only one status.
pub async fn list_orders(
    services: &Services,
    status: Option<OrderStatus>,
) -> ApiResult<Vec<Order>> {
    debug!(status = ?status, "list_orders command");
    Ok(services.orders.all_orders(status).await?)
}

/// Moves an order to a new status.
///
/// ## Errors
/// - `NOT_FOUND` for an unknown order
/// - `BUSINESS_LOGIC` when the order is final, already has that status, or
///   changed status since it was read
pub async fn set_order_status(
    services: &Services,
    order_id: String,
    status: OrderStatus,
) -> ApiResult<Order> {
    debug!(order_id = %order_id, status = %status, "set_order_status command");

    let (mut order, _) = services
        .orders
        .order_with_items(&order_id)
        .await?
        .ok_or_else(|| CoreError::OrderNotFound(order_id.clone()))?;

    let from = order.status;
    if !from.can_transition_to(status) {
        return Err(CoreError::InvalidStatusTransition { from, to: status }.into());
    }

    if !services.orders.transition_order(&order_id, from, status).await? {
        warn!(order_id = %order_id, from = %from, "Order changed before status update");
        return Err(ApiError::business(
            "Order was updated by someone else. Reload and try again.",
        ));
    }

    info!(order_id = %order_id, from = %from, to = %status, "Order status changed");
    order.status = status;
    Ok(order)
}

/// Deletes an order and its lines.
pub async fn delete_order(services: &Services, order_id: String) -> ApiResult<()> {
    debug!(order_id = %order_id, "delete_order command");
    if !services.orders.delete_order(&order_id).await? {
        return Err(CoreError::OrderNotFound(order_id).into());
    }
    info!(order_id = %order_id, "Order deleted");
    Ok(())
}

// =============================================================================
// Coupons
// =============================================================================

/// New coupon as entered in the back office.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCouponRequest {
    pub code: String,
    pub discount_percent: u32,
    pub usage_limit: i64,
}

pub async fn list_coupons(services: &Services) -> ApiResult<Vec<Coupon>> {
    debug!("list_coupons command");
    Ok(services.coupons.list_coupons().await?)
}

pub async fn create_coupon(services: &Services, request: CreateCouponRequest) -> ApiResult<Coupon> {
    debug!(code = %request.code, "create_coupon command");
    let code = validate_coupon_code(&request.code)?;
    validate_discount_percent(request.discount_percent)?;
    validate_usage_limit(request.usage_limit)?;

    let coupon = services
        .coupons
        .create_coupon(NewCoupon {
            code,
            discount_percent: request.discount_percent,
            usage_limit: request.usage_limit,
        })
        .await?;

    info!(code = %coupon.code, percent = coupon.discount_percent, "Coupon created");
    Ok(coupon)
}

pub async fn delete_coupon(services: &Services, coupon_id: String) -> ApiResult<()> {
    debug!(coupon_id = %coupon_id, "delete_coupon command");
    if !services.coupons.delete_coupon(&coupon_id).await? {
        return Err(ApiError::not_found("Coupon", &coupon_id));
    }
    Ok(())
}

/// Deletes every used-up coupon. Returns how many were removed.
pub async fn sweep_coupons(services: &Services) -> ApiResult<u64> {
    debug!("sweep_coupons command");
    let removed = services.coupons.sweep_exhausted_coupons().await?;
    info!(removed, "Used-up coupons swept");
    Ok(removed)
}

// =============================================================================
// Delivery Locations
// =============================================================================

pub async fn list_locations(services: &Services) -> ApiResult<Vec<DeliveryLocation>> {
    debug!("list_locations command");
    Ok(services.locations.list_locations().await?)
}

fn delivery_fee(fils: i64) -> ApiResult<Money> {
    if fils < 0 {
        return Err(ApiError::validation("Delivery fee cannot be negative"));
    }
    Ok(Money::from_fils(fils))
}

pub async fn set_location_cost(
    services: &Services,
    location_id: String,
    cost_fils: i64,
) -> ApiResult<()> {
    debug!(location_id = %location_id, cost_fils, "set_location_cost command");
    let cost = delivery_fee(cost_fils)?;
    services.locations.set_location_cost(&location_id, cost).await?;
    info!(location_id = %location_id, cost = %cost, "Delivery fee updated");
    Ok(())
}

/// Sets one fee for every city of an emirate. Returns the cities updated.
pub async fn set_emirate_cost(
    services: &Services,
    emirate: String,
    cost_fils: i64,
) -> ApiResult<u64> {
    debug!(emirate = %emirate, cost_fils, "set_emirate_cost command");
    let cost = delivery_fee(cost_fils)?;
    let emirate = emirate.trim();
    if emirate.is_empty() {
        return Err(ApiError::validation("emirate is required"));
    }

    let updated = services.locations.set_emirate_cost(emirate, cost).await?;
    info!(emirate = %emirate, cost = %cost, updated, "Emirate delivery fee updated");
    Ok(updated)
}

// =============================================================================
// Products
// =============================================================================

/// Stores an image and points the product at it.
///
/// ## Returns
/// The product with its new image URL.
pub async fn upload_product_image(
    services: &Services,
    product_id: String,
    file_name: String,
    bytes: Vec<u8>,
) -> ApiResult<Product> {
    debug!(
        product_id = %product_id,
        file_name = %file_name,
        size = bytes.len(),
        "upload_product_image command"
    );
    if bytes.is_empty() {
        return Err(ApiError::validation("Image file is empty"));
    }

    let mut product = services
        .catalog
        .product(&product_id)
        .await?
        .ok_or_else(|| CoreError::ProductNotFound(product_id.clone()))?;

    let url = services.media.upload(&file_name, bytes).await?;
    services.catalog.set_product_image(&product_id, &url).await?;

    info!(product_id = %product_id, url = %url, "Product image updated");
    product.image_url = url;
    Ok(product)
}

pub async fn set_product_stock(
    services: &Services,
    product_id: String,
    stock: i64,
) -> ApiResult<()> {
    debug!(product_id = %product_id, stock, "set_product_stock command");
    if stock < 0 {
        return Err(ApiError::validation("Stock cannot be negative"));
    }
    services.catalog.set_product_stock(&product_id, stock).await?;
    info!(product_id = %product_id, stock, "Stock updated");
    Ok(())
}

// =============================================================================
// Newsletter
// =============================================================================

/// Outcome of a newsletter broadcast.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BroadcastReport {
    pub sent: usize,
    pub failed: usize,
}

/// Emails every subscriber. A failed recipient is logged and skipped.
pub async fn broadcast_newsletter(
    services: &Services,
    config: &ConfigState,
    subject: String,
    message: String,
) -> ApiResult<BroadcastReport> {
    debug!(subject = %subject, "broadcast_newsletter command");
    let subject = subject.trim();
    let message = message.trim();
    if subject.is_empty() || message.is_empty() {
        return Err(ApiError::validation("Subject and message are required"));
    }

    let subscribers = services.subscribers.list_subscribers().await?;
    let mut report = BroadcastReport { sent: 0, failed: 0 };

    for subscriber in &subscribers {
        let vars = EmailVars {
            to_email: subscriber.email.clone(),
            to_name: subscriber
                .email
                .split('@')
                .next()
                .unwrap_or_default()
                .to_string(),
            subject: subject.to_string(),
            message: message.to_string(),
            unsub_id: subscriber.unsub_token.clone(),
        };

        match services.email.send(&config.email.template_id, &vars).await {
            Ok(()) => report.sent += 1,
            Err(e) => {
                warn!(email = %subscriber.email, error = %e, "Newsletter delivery failed");
                report.failed += 1;
            }
        }
    }

    info!(sent = report.sent, failed = report.failed, "Newsletter broadcast finished");
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::fixtures::{perfume, seed_catalog};
    use crate::error::ErrorCode;
    use crate::services::testing::{sqlite_services, MockServices};
    use crate::services::StoreError;
    use chrono::Utc;
    use zari_core::{FulfillmentMethod, NewOrder, NewOrderItem, PaymentMethod, Subscriber};

    fn pickup_order() -> NewOrder {
        NewOrder {
            user_id: None,
            customer_email: "guest@example.com".to_string(),
            customer_phone: "501234567".to_string(),
            total: Money::from_units(100),
            delivery_fee: Money::zero(),
            discount: Money::zero(),
            gift_fee: Money::zero(),
            payment_method: PaymentMethod::Card,
            fulfillment: FulfillmentMethod::Pickup,
            address: "Pickup from Store".to_string(),
            is_gift: false,
            gift_note: None,
            notes: String::new(),
            coupon_code: None,
            status: OrderStatus::Waiting,
            items: vec![NewOrderItem {
                product_id: None,
                product_name: "Musk Tahara".to_string(),
                unit_price: Money::from_units(100),
                quantity: 1,
            }],
        }
    }

    #[tokio::test]
    async fn test_status_walk_to_delivered() {
        let (services, db) = sqlite_services().await;
        let (order, _) = db.orders().place(&pickup_order()).await.unwrap();

        for status in [OrderStatus::Prepared, OrderStatus::Shipped, OrderStatus::Delivered] {
            let updated = set_order_status(&services, order.id.clone(), status)
                .await
                .unwrap();
            assert_eq!(updated.status, status);
        }

        let err = set_order_status(&services, order.id.clone(), OrderStatus::Waiting)
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::BusinessLogic);
        assert_eq!(err.message, "Order cannot move from delivered to waiting");

        let delivered = list_orders(&services, Some(OrderStatus::Delivered))
            .await
            .unwrap();
        assert_eq!(delivered.len(), 1);

        delete_order(&services, order.id.clone()).await.unwrap();
        let err = delete_order(&services, order.id).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);
    }

    #[tokio::test]
    async fn test_staff_reopen_canceled_order() {
        let (services, db) = sqlite_services().await;
        let (order, _) = db.orders().place(&pickup_order()).await.unwrap();

        set_order_status(&services, order.id.clone(), OrderStatus::Canceled)
            .await
            .unwrap();
        let reopened = set_order_status(&services, order.id.clone(), OrderStatus::Waiting)
            .await
            .unwrap();
        assert_eq!(reopened.status, OrderStatus::Waiting);

        let stored = db.orders().get_by_id(&order.id).await.unwrap().unwrap();
        assert_eq!(stored.status, OrderStatus::Waiting);
    }

    #[tokio::test]
    async fn test_status_change_lost_to_other_staff() {
        let mut mocks = MockServices::new();
        mocks
            .orders
            .expect_order_with_items()
            .returning(|id| Ok(Some((waiting_order(id), vec![]))));
        mocks
            .orders
            .expect_transition_order()
            .withf(|_, from, to| *from == OrderStatus::Waiting && *to == OrderStatus::Prepared)
            .returning(|_, _, _| Ok(false));
        let services = mocks.build();

        let err = set_order_status(&services, "o-1".to_string(), OrderStatus::Prepared)
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::BusinessLogic);
    }

    fn waiting_order(id: &str) -> Order {
        let new = pickup_order();
        Order {
            id: id.to_string(),
            user_id: None,
            customer_email: new.customer_email,
            customer_phone: new.customer_phone,
            total: new.total,
            payment_method: new.payment_method,
            fulfillment: new.fulfillment,
            address: new.address,
            delivery_fee: new.delivery_fee,
            discount: new.discount,
            gift_fee: new.gift_fee,
            is_gift: false,
            gift_note: None,
            notes: String::new(),
            coupon_code: None,
            status: OrderStatus::Waiting,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_coupon_admin_cycle() {
        let (services, _db) = sqlite_services().await;

        let coupon = create_coupon(
            &services,
            CreateCouponRequest {
                code: " eid25 ".to_string(),
                discount_percent: 25,
                usage_limit: 1,
            },
        )
        .await
        .unwrap();
        assert_eq!(coupon.code, "EID25");
        assert_eq!(coupon.times_used, 0);

        let err = create_coupon(
            &services,
            CreateCouponRequest {
                code: "HALF".to_string(),
                discount_percent: 0,
                usage_limit: 5,
            },
        )
        .await
        .unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);

        assert_eq!(list_coupons(&services).await.unwrap().len(), 1);
        assert_eq!(sweep_coupons(&services).await.unwrap(), 0);

        delete_coupon(&services, coupon.id.clone()).await.unwrap();
        assert!(list_coupons(&services).await.unwrap().is_empty());
        assert!(delete_coupon(&services, coupon.id).await.is_err());
    }

    #[tokio::test]
    async fn test_emirate_cost_updates_all_cities() {
        let (services, db) = sqlite_services().await;
        for city in ["Deira", "Marina", "Jumeirah"] {
            db.locations()
                .insert("Dubai", city, Money::from_units(15))
                .await
                .unwrap();
        }
        db.locations()
            .insert("Sharjah", "Al Nahda", Money::from_units(25))
            .await
            .unwrap();

        assert_eq!(
            set_emirate_cost(&services, " Dubai ".to_string(), 2000).await.unwrap(),
            3
        );
        let locations = list_locations(&services).await.unwrap();
        let sharjah = locations.iter().find(|l| l.emirate == "Sharjah").unwrap();
        assert_eq!(sharjah.cost, Money::from_units(25));
        assert!(locations
            .iter()
            .filter(|l| l.emirate == "Dubai")
            .all(|l| l.cost == Money::from_units(20)));

        set_location_cost(&services, sharjah.id.clone(), 3000).await.unwrap();
        assert!(set_location_cost(&services, sharjah.id.clone(), -1).await.is_err());
    }

    #[tokio::test]
    async fn test_upload_sets_image_url() {
        let (_, db) = sqlite_services().await;
        seed_catalog(&db, &[perfume("p-1", 100, 5)]).await;

        let mut mocks = MockServices::new();
        mocks
            .media
            .expect_upload()
            .withf(|name, bytes| name == "oud.png" && bytes.len() == 3)
            .returning(|_, _| Ok("https://cdn.example.com/oud.png".to_string()));
        let mut services = mocks.build();
        services.catalog = std::sync::Arc::new(db.clone());

        let product = upload_product_image(
            &services,
            "p-1".to_string(),
            "oud.png".to_string(),
            vec![1, 2, 3],
        )
        .await
        .unwrap();
        assert_eq!(product.image_url, "https://cdn.example.com/oud.png");

        let stored = db.products().get_by_id("p-1").await.unwrap().unwrap();
        assert_eq!(stored.image_url, "https://cdn.example.com/oud.png");

        set_product_stock(&services, "p-1".to_string(), 0).await.unwrap();
        let stored = db.products().get_by_id("p-1").await.unwrap().unwrap();
        assert!(stored.is_out_of_stock());
    }

    #[tokio::test]
    async fn test_broadcast_skips_failed_recipients() {
        let mut mocks = MockServices::new();
        mocks.subscribers.expect_list_subscribers().returning(|| {
            Ok(["amal@example.com", "bounce@example.com", "omar@example.com"]
                .into_iter()
                .map(|email| Subscriber {
                    id: email.to_string(),
                    email: email.to_string(),
                    phone: None,
                    unsub_token: format!("token-{email}"),
                    created_at: Utc::now(),
                })
                .collect())
        });
        mocks
            .email
            .expect_send()
            .withf(|template, vars| {
                template == "template_news"
                    && vars.subject == "Eid collection"
                    && vars.unsub_id == format!("token-{}", vars.to_email)
            })
            .times(3)
            .returning(|_, vars| {
                if vars.to_email.starts_with("bounce") {
                    Err(StoreError::unavailable("email", "mailbox full"))
                } else {
                    Ok(())
                }
            });
        let services = mocks.build();
        let mut config = ConfigState::default();
        config.email.template_id = "template_news".to_string();

        let report = broadcast_newsletter(
            &services,
            &config,
            " Eid collection ".to_string(),
            "New oud blends are in.".to_string(),
        )
        .await
        .unwrap();
        assert_eq!(report, BroadcastReport { sent: 2, failed: 1 });
    }

    #[tokio::test]
    async fn test_broadcast_needs_subject() {
        let services = MockServices::new().build();
        let err = broadcast_newsletter(
            &services,
            &ConfigState::default(),
            "  ".to_string(),
            "body".to_string(),
        )
        .await
        .unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
    }
}
