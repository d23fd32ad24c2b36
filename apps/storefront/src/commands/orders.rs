//! # Order Commands
//!
//! A signed-in shopper's order history, receipts and cancellation.
//!
//! Orders that belong to someone else are reported as not found.

use tracing::{debug, info};
use zari_core::{CoreError, Order, OrderItem, OrderStatus, Receipt};

use super::signed_in_user;
use crate::error::{ApiError, ApiResult};
use crate::services::Services;
use crate::state::{ConfigState, SessionState};

async fn owned_order(
    services: &Services,
    user_id: &str,
    order_id: &str,
) -> ApiResult<(Order, Vec<OrderItem>)> {
    match services.orders.order_with_items(order_id).await? {
        Some((order, items)) if order.user_id.as_deref() == Some(user_id) => Ok((order, items)),
        _ => Err(CoreError::OrderNotFound(order_id.to_string()).into()),
    }
}

/// Orders of the signed-in shopper, newest first.
pub async fn order_history(services: &Services, session: &SessionState) -> ApiResult<Vec<Order>> {
    let user = signed_in_user(services, session).await?;
    debug!(user_id = %user.id, "order_history command");
    Ok(services.orders.orders_for_user(&user.id).await?)
}

pub async fn get_receipt(
    services: &Services,
    config: &ConfigState,
    session: &SessionState,
    order_id: String,
) -> ApiResult<Receipt> {
    let user = signed_in_user(services, session).await?;
    debug!(order_id = %order_id, "get_receipt command");
    let (order, items) = owned_order(services, &user.id, &order_id).await?;
    Ok(Receipt::new(&config.store.name, &order, &items))
}

/// Cancels an order nobody has started on yet.
///
/// ## Errors
/// - `OrderNotCancellable` once staff moved it past waiting, including when
///   that happens between the read and the write
pub async fn cancel_order(
    services: &Services,
    session: &SessionState,
    order_id: String,
) -> ApiResult<Order> {
    let user = signed_in_user(services, session).await?;
    debug!(order_id = %order_id, "cancel_order command");

    let (mut order, _) = owned_order(services, &user.id, &order_id).await?;
    let not_cancellable = |status| -> ApiError {
        CoreError::OrderNotCancellable {
            order_id: order_id.clone(),
            status,
        }
        .into()
    };

    if !order.status.is_customer_cancellable() {
        return Err(not_cancellable(order.status));
    }

    if !services
        .orders
        .cancel_waiting_order(&order_id, &user.id)
        .await?
    {
        let current = services
            .orders
            .order_with_items(&order_id)
            .await?
            .map(|(o, _)| o.status)
            .unwrap_or(OrderStatus::Canceled);
        return Err(not_cancellable(current));
    }

    info!(order_id = %order_id, user_id = %user.id, "Order canceled by shopper");
    order.status = OrderStatus::Canceled;
    Ok(order)
}
