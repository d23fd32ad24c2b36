//! Coupon store.

use async_trait::async_trait;
use mockall::automock;
use zari_core::Coupon;
use zari_db::{Database, NewCoupon};

use super::StoreResult;

#[async_trait]
impl CouponStore for Database {
    async fn find_active_coupon(&self, code: &str) -> StoreResult<Option<Coupon>> {
        Ok(self.coupons().find_active_by_code(code).await?)
    }

    async fn list_coupons(&self) -> StoreResult<Vec<Coupon>> {
        Ok(self.coupons().list().await?)
    }

    async fn create_coupon(&self, coupon: NewCoupon) -> StoreResult<Coupon> {
        Ok(self.coupons().insert(&coupon).await?)
    }

    async fn delete_coupon(&self, id: &str) -> StoreResult<bool> {
        Ok(self.coupons().delete(id).await?)
    }

    async fn sweep_exhausted_coupons(&self) -> StoreResult<u64> {
        Ok(self.coupons().sweep_exhausted().await?)
    }
}

#[automock]
#[async_trait]
pub trait CouponStore: Send + Sync {
    /// The active coupon with this uppercase code, used up or not.
    async fn find_active_coupon(&self, code: &str) -> StoreResult<Option<Coupon>>;

    async fn list_coupons(&self) -> StoreResult<Vec<Coupon>>;

    async fn create_coupon(&self, coupon: NewCoupon) -> StoreResult<Coupon>;

    async fn delete_coupon(&self, id: &str) -> StoreResult<bool>;

    /// Deletes every coupon whose uses are all taken.
    async fn sweep_exhausted_coupons(&self) -> StoreResult<u64>;
}
