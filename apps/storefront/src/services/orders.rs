//! Order store.

use async_trait::async_trait;
use mockall::automock;
use zari_core::{NewOrder, Order, OrderItem, OrderStatus};
use zari_db::Database;

use super::StoreResult;

#[async_trait]
impl OrderStore for Database {
    async fn place_order(&self, order: &NewOrder) -> StoreResult<(Order, Vec<OrderItem>)> {
        Ok(self.orders().place(order).await?)
    }

    async fn order_with_items(&self, id: &str) -> StoreResult<Option<(Order, Vec<OrderItem>)>> {
        Ok(self.orders().get_with_items(id).await?)
    }

    async fn orders_for_user(&self, user_id: &str) -> StoreResult<Vec<Order>> {
        Ok(self.orders().list_for_user(user_id).await?)
    }

    async fn all_orders(&self, status: Option<OrderStatus>) -> StoreResult<Vec<Order>> {
        Ok(self.orders().list_all(status).await?)
    }

    async fn transition_order(
        &self,
        id: &str,
        from: OrderStatus,
        to: OrderStatus,
    ) -> StoreResult<bool> {
        Ok(self.orders().transition_status(id, from, to).await?)
    }

    async fn cancel_waiting_order(&self, id: &str, user_id: &str) -> StoreResult<bool> {
        Ok(self.orders().cancel_if_waiting(id, user_id).await?)
    }

    async fn delete_order(&self, id: &str) -> StoreResult<bool> {
        Ok(self.orders().delete(id).await?)
    }
}

#[automock]
#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Header, lines and coupon use in one atomic write.
    async fn place_order(&self, order: &NewOrder) -> StoreResult<(Order, Vec<OrderItem>)>;

    async fn order_with_items(&self, id: &str) -> StoreResult<Option<(Order, Vec<OrderItem>)>>;

    /// Newest first.
    async fn orders_for_user(&self, user_id: &str) -> StoreResult<Vec<Order>>;

    /// Newest first, optionally one status only.
    async fn all_orders(&self, status: Option<OrderStatus>) -> StoreResult<Vec<Order>>;

    /// `false` if the order was no longer in `from`.
    async fn transition_order(
        &self,
        id: &str,
        from: OrderStatus,
        to: OrderStatus,
    ) -> StoreResult<bool>;

    /// `false` unless the order belongs to `user_id` and is still waiting.
    async fn cancel_waiting_order(&self, id: &str, user_id: &str) -> StoreResult<bool>;

    async fn delete_order(&self, id: &str) -> StoreResult<bool>;
}
