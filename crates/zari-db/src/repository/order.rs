//! # Order Repository
//!
//! Database operations for orders and their lines.
//!
//! ## Order Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Order Lifecycle                                   │
//! │                                                                         │
//! │  1. PLACE (one transaction)                                            │
//! │     └── INSERT orders        → header { status: waiting }              │
//! │     └── INSERT order_items   → one row per cart line, in cart order    │
//! │     └── UPDATE coupons       → take one use (if a code was applied)    │
//! │     └── COMMIT, or nothing at all                                      │
//! │                                                                         │
//! │  2. STAFF                                                              │
//! │     └── transition_status()  → prepared / shipped / delivered / ...    │
//! │                                                                         │
//! │  3. SHOPPER                                                            │
//! │     └── cancel_if_waiting()  → canceled, only while still waiting      │
//! │                                                                         │
//! │  4. BACK OFFICE                                                        │
//! │     └── delete()             → header and lines removed together       │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use sqlx::{FromRow, SqlitePool};
use tracing::{debug, info};

use super::{coupon, new_id, non_negative, parse_column};
use crate::error::{DbError, DbResult};
use zari_core::{
    FulfillmentMethod, Money, NewOrder, Order, OrderItem, OrderStatus, PaymentMethod,
};

const ORDER_COLUMNS: &str = "id, user_id, customer_email, customer_phone, total_fils, \
     delivery_fee_fils, discount_fils, gift_fee_fils, payment_method, fulfillment, address, \
     is_gift, gift_note, notes, coupon_code, status, created_at";

#[derive(Debug, FromRow)]
struct OrderRow {
    id: String,
    user_id: Option<String>,
    customer_email: String,
    customer_phone: String,
    total_fils: i64,
    delivery_fee_fils: i64,
    discount_fils: i64,
    gift_fee_fils: i64,
    payment_method: String,
    fulfillment: String,
    address: String,
    is_gift: bool,
    gift_note: Option<String>,
    notes: String,
    coupon_code: Option<String>,
    status: String,
    created_at: DateTime<Utc>,
}

fn payment_column(method: PaymentMethod) -> &'static str {
    match method {
        PaymentMethod::Cash => "cash",
        PaymentMethod::Card => "card",
    }
}

impl TryFrom<OrderRow> for Order {
    type Error = DbError;

    fn try_from(row: OrderRow) -> DbResult<Self> {
        let payment_method: PaymentMethod = parse_column("order", &row.id, &row.payment_method)?;
        let fulfillment: FulfillmentMethod = parse_column("order", &row.id, &row.fulfillment)?;
        let status: OrderStatus = parse_column("order", &row.id, &row.status)?;
        let total = non_negative("order", &row.id, "total", row.total_fils)?;
        let delivery_fee = non_negative("order", &row.id, "delivery fee", row.delivery_fee_fils)?;
        let discount = non_negative("order", &row.id, "discount", row.discount_fils)?;
        let gift_fee = non_negative("order", &row.id, "gift fee", row.gift_fee_fils)?;

        Ok(Order {
            id: row.id,
            user_id: row.user_id,
            customer_email: row.customer_email,
            customer_phone: row.customer_phone,
            total: Money::from_fils(total),
            payment_method,
            fulfillment,
            address: row.address,
            delivery_fee: Money::from_fils(delivery_fee),
            discount: Money::from_fils(discount),
            gift_fee: Money::from_fils(gift_fee),
            is_gift: row.is_gift,
            gift_note: row.gift_note,
            notes: row.notes,
            coupon_code: row.coupon_code,
            status,
            created_at: row.created_at,
        })
    }
}

#[derive(Debug, FromRow)]
struct OrderItemRow {
    id: String,
    order_id: String,
    product_id: Option<String>,
    product_name: String,
    unit_price_fils: i64,
    quantity: i64,
}

impl TryFrom<OrderItemRow> for OrderItem {
    type Error = DbError;

    fn try_from(row: OrderItemRow) -> DbResult<Self> {
        let unit_price = non_negative("order item", &row.id, "unit price", row.unit_price_fils)?;
        let quantity = u32::try_from(row.quantity)
            .ok()
            .filter(|q| *q >= 1)
            .ok_or_else(|| {
                DbError::malformed("order item", &row.id, format!("quantity {}", row.quantity))
            })?;

        Ok(OrderItem {
            id: row.id,
            order_id: row.order_id,
            product_id: row.product_id,
            product_name: row.product_name,
            unit_price: Money::from_fils(unit_price),
            quantity,
        })
    }
}

fn into_orders(rows: Vec<OrderRow>) -> DbResult<Vec<Order>> {
    rows.into_iter().map(Order::try_from).collect()
}

/// Repository for order database operations.
#[derive(Debug, Clone)]
pub struct OrderRepository {
    pool: SqlitePool,
}

impl OrderRepository {
    /// Creates a new OrderRepository.
    pub fn new(pool: SqlitePool) -> Self {
        OrderRepository { pool }
    }

    /// Writes the header, every line and the coupon use atomically.
    ///
    /// ## Errors
    /// * `DbError::CouponUnavailable` - the applied code ran out first;
    ///   nothing was written
    /// * any other failure also leaves no trace of the order
    pub async fn place(&self, order: &NewOrder) -> DbResult<(Order, Vec<OrderItem>)> {
        let id = new_id();
        let now = Utc::now();

        debug!(
            order_id = %id,
            items = order.items.len(),
            total = %order.total,
            "Placing order"
        );

        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO orders (
                id, user_id, customer_email, customer_phone, total_fils,
                delivery_fee_fils, discount_fils, gift_fee_fils, payment_method, fulfillment,
                address, is_gift, gift_note, notes, coupon_code, status, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?17)
            "#,
        )
        .bind(&id)
        .bind(&order.user_id)
        .bind(&order.customer_email)
        .bind(&order.customer_phone)
        .bind(order.total.fils())
        .bind(order.delivery_fee.fils())
        .bind(order.discount.fils())
        .bind(order.gift_fee.fils())
        .bind(payment_column(order.payment_method))
        .bind(order.fulfillment.as_str())
        .bind(&order.address)
        .bind(order.is_gift)
        .bind(&order.gift_note)
        .bind(&order.notes)
        .bind(&order.coupon_code)
        .bind(order.status.as_str())
        .bind(now)
        .execute(&mut *tx)
        .await?;

        let mut items = Vec::with_capacity(order.items.len());
        for (position, item) in order.items.iter().enumerate() {
            let item_id = new_id();
            sqlx::query(
                r#"
                INSERT INTO order_items (
                    id, order_id, product_id, product_name, unit_price_fils, quantity, position
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                "#,
            )
            .bind(&item_id)
            .bind(&id)
            .bind(&item.product_id)
            .bind(&item.product_name)
            .bind(item.unit_price.fils())
            .bind(i64::from(item.quantity))
            .bind(position as i64)
            .execute(&mut *tx)
            .await?;

            items.push(OrderItem {
                id: item_id,
                order_id: id.clone(),
                product_id: item.product_id.clone(),
                product_name: item.product_name.clone(),
                unit_price: item.unit_price,
                quantity: item.quantity,
            });
        }

        if let Some(code) = &order.coupon_code {
            coupon::redeem(&mut *tx, code).await?;
        }

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        info!(order_id = %id, total = %order.total, "Order placed");

        let placed = Order {
            id,
            user_id: order.user_id.clone(),
            customer_email: order.customer_email.clone(),
            customer_phone: order.customer_phone.clone(),
            total: order.total,
            payment_method: order.payment_method,
            fulfillment: order.fulfillment,
            address: order.address.clone(),
            delivery_fee: order.delivery_fee,
            discount: order.discount,
            gift_fee: order.gift_fee,
            is_gift: order.is_gift,
            gift_note: order.gift_note.clone(),
            notes: order.notes.clone(),
            coupon_code: order.coupon_code.clone(),
            status: order.status,
            created_at: now,
        };
        Ok((placed, items))
    }

    /// Gets an order header by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Order>> {
        let row: Option<OrderRow> =
            sqlx::query_as(&format!("SELECT {ORDER_COLUMNS} FROM orders WHERE id = ?1"))
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        row.map(Order::try_from).transpose()
    }

    /// Lines of an order, in the order they were in the cart.
    pub async fn get_items(&self, order_id: &str) -> DbResult<Vec<OrderItem>> {
        let rows: Vec<OrderItemRow> = sqlx::query_as(
            r#"
            SELECT id, order_id, product_id, product_name, unit_price_fils, quantity
            FROM order_items
            WHERE order_id = ?1
            ORDER BY position
            "#,
        )
        .bind(order_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(OrderItem::try_from).collect()
    }

    /// Header and lines together.
    pub async fn get_with_items(&self, id: &str) -> DbResult<Option<(Order, Vec<OrderItem>)>> {
        let Some(order) = self.get_by_id(id).await? else {
            return Ok(None);
        };
        let items = self.get_items(id).await?;
        Ok(Some((order, items)))
    }

    /// A shopper's order history, newest first.
    pub async fn list_for_user(&self, user_id: &str) -> DbResult<Vec<Order>> {
        let rows: Vec<OrderRow> = sqlx::query_as(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE user_id = ?1 ORDER BY created_at DESC"
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        into_orders(rows)
    }

    /// Every order, newest first, optionally narrowed to one status.
    pub async fn list_all(&self, status: Option<OrderStatus>) -> DbResult<Vec<Order>> {
        let rows: Vec<OrderRow> = match status {
            Some(status) => {
                sqlx::query_as(&format!(
                    "SELECT {ORDER_COLUMNS} FROM orders WHERE status = ?1 ORDER BY created_at DESC"
                ))
                .bind(status.as_str())
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as(&format!(
                    "SELECT {ORDER_COLUMNS} FROM orders ORDER BY created_at DESC"
                ))
                .fetch_all(&self.pool)
                .await?
            }
        };

        into_orders(rows)
    }

    /// Moves an order from `from` to `to`.
    ///
    /// Returns `false` when the order was no longer in `from`, so two staff
    /// members cannot both act on the same state.
    pub async fn transition_status(
        &self,
        id: &str,
        from: OrderStatus,
        to: OrderStatus,
    ) -> DbResult<bool> {
        let result = sqlx::query(
            "UPDATE orders SET status = ?3, updated_at = ?4 WHERE id = ?1 AND status = ?2",
        )
        .bind(id)
        .bind(from.as_str())
        .bind(to.as_str())
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        let moved = result.rows_affected() > 0;
        if moved {
            info!(order_id = %id, from = %from, to = %to, "Order status changed");
        }
        Ok(moved)
    }

    /// Cancels the shopper's own order if staff have not started on it.
    pub async fn cancel_if_waiting(&self, id: &str, user_id: &str) -> DbResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE orders SET status = 'canceled', updated_at = ?3
            WHERE id = ?1 AND user_id = ?2 AND status = 'waiting'
            "#,
        )
        .bind(id)
        .bind(user_id)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Removes an order and its lines.
    pub async fn delete(&self, id: &str) -> DbResult<bool> {
        let result = sqlx::query("DELETE FROM orders WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() > 0 {
            info!(order_id = %id, "Order deleted");
        }
        Ok(result.rows_affected() > 0)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
