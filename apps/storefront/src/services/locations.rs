//! Delivery location store.

use async_trait::async_trait;
use mockall::automock;
use zari_core::{DeliveryLocation, Money};
use zari_db::Database;

use super::StoreResult;

#[async_trait]
impl LocationStore for Database {
    async fn list_locations(&self) -> StoreResult<Vec<DeliveryLocation>> {
        Ok(self.locations().list().await?)
    }

    async fn set_location_cost(&self, id: &str, cost: Money) -> StoreResult<()> {
        Ok(self.locations().update_cost(id, cost).await?)
    }

    async fn set_emirate_cost(&self, emirate: &str, cost: Money) -> StoreResult<u64> {
        Ok(self.locations().update_cost_for_emirate(emirate, cost).await?)
    }
}

#[automock]
#[async_trait]
pub trait LocationStore: Send + Sync {
    async fn list_locations(&self) -> StoreResult<Vec<DeliveryLocation>>;

    async fn set_location_cost(&self, id: &str, cost: Money) -> StoreResult<()>;

    /// Same cost for every city of `emirate`; returns how many changed.
    async fn set_emirate_cost(&self, emirate: &str, cost: Money) -> StoreResult<u64>;
}
