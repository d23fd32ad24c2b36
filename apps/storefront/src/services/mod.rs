//! # Services
//!
//! The collaborators the storefront talks to, each behind a trait.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Collaborator Seams                                   │
//! │                                                                         │
//! │  commands/*                                                            │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Services { catalog, coupons, locations, orders, profiles,             │
//! │             subscribers, auth, email, media }                          │
//! │       │                                                                 │
//! │       ├── data store traits ──► zari_db::Database (SQLite)             │
//! │       ├── AuthProvider ───────► LocalAuthProvider (codes to the log)   │
//! │       ├── EmailDispatcher ────► LogEmailDispatcher                     │
//! │       └── MediaStore ─────────► LocalMediaStore (files on disk)        │
//! │                                                                         │
//! │  Tests swap any of them for a `Mock*` generated by mockall.            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::Arc;

use thiserror::Error;
use zari_db::{Database, DbError};

pub mod accounts;
pub mod catalog;
pub mod coupons;
pub mod email;
pub mod locations;
pub mod media;
pub mod orders;

pub use accounts::{AuthProvider, LocalAuthProvider, ProfileStore, SubscriberStore};
pub use catalog::CatalogStore;
pub use coupons::CouponStore;
pub use email::{EmailDispatcher, EmailVars, LogEmailDispatcher};
pub use locations::LocationStore;
pub use media::{LocalMediaStore, MediaStore};
pub use orders::OrderStore;

/// Collaborator failures.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The last use of a coupon went to another order.
    #[error("coupon {0} has no uses left")]
    CouponUnavailable(String),

    #[error("data store error")]
    Database(#[source] DbError),

    /// The collaborator answered but refused the request.
    #[error("{0}")]
    Rejected(String),

    /// The collaborator could not be reached or failed.
    #[error("{service} unavailable: {reason}")]
    Unavailable {
        service: &'static str,
        reason: String,
    },
}

impl StoreError {
    pub fn unavailable(service: &'static str, reason: impl ToString) -> Self {
        StoreError::Unavailable {
            service,
            reason: reason.to_string(),
        }
    }
}

impl From<DbError> for StoreError {
    fn from(error: DbError) -> Self {
        match error {
            DbError::CouponUnavailable(code) => StoreError::CouponUnavailable(code),
            other => StoreError::Database(other),
        }
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Every collaborator, injected into command handlers.
#[derive(Clone)]
pub struct Services {
    pub catalog: Arc<dyn CatalogStore>,
    pub coupons: Arc<dyn CouponStore>,
    pub locations: Arc<dyn LocationStore>,
    pub orders: Arc<dyn OrderStore>,
    pub profiles: Arc<dyn ProfileStore>,
    pub subscribers: Arc<dyn SubscriberStore>,
    pub auth: Arc<dyn AuthProvider>,
    pub email: Arc<dyn EmailDispatcher>,
    pub media: Arc<dyn MediaStore>,
}

impl Services {
    /// Data store traits served by one SQLite database.
    pub fn new(
        db: Database,
        auth: Arc<dyn AuthProvider>,
        email: Arc<dyn EmailDispatcher>,
        media: Arc<dyn MediaStore>,
    ) -> Self {
        let db = Arc::new(db);
        Services {
            catalog: db.clone(),
            coupons: db.clone(),
            locations: db.clone(),
            orders: db.clone(),
            profiles: db.clone(),
            subscribers: db,
            auth,
            email,
            media,
        }
    }
}

impl std::fmt::Debug for Services {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Services").finish_non_exhaustive()
    }
}
