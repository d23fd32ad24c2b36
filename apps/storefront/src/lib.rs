//! # Zari Storefront Library
//!
//! Command layer for the Zari perfume storefront and its back office.
//! A frontend (web view, HTTP bridge, tests) calls the functions in
//! [`commands`] with the state they declare.
//!
//! ## Module Organization
//! ```text
//! zari_storefront/
//! ├── lib.rs          ◄─── You are here (startup & shutdown)
//! ├── telemetry.rs    ◄─── tracing subscriber
//! ├── error.rs        ◄─── API error type for commands
//! ├── services/       ◄─── Collaborator traits (data, auth, email, media)
//! ├── state/
//! │   ├── config.rs   ◄─── Configuration (file + ZARI_* env)
//! │   ├── cart.rs     ◄─── Cart, coupon, JSON snapshot
//! │   ├── checkout.rs ◄─── Step machine, fee table, submission guard
//! │   ├── session.rs  ◄─── Signed-in user, language, verified phone
//! │   └── flight.rs   ◄─── Single-flight guard
//! └── commands/       ◄─── catalog, cart, coupon, checkout, orders,
//!                          account, admin, config
//! ```
//!
//! ## State Management
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Storefront State                                     │
//! │                                                                         │
//! │  ┌──────────────┐ ┌──────────────┐ ┌──────────────┐ ┌──────────────┐   │
//! │  │  Services    │ │  CartState   │ │CheckoutState │ │ SessionState │   │
//! │  │              │ │              │ │              │ │              │   │
//! │  │ • data store │ │ • lines      │ │ • step       │ │ • user       │   │
//! │  │ • auth       │ │ • coupon     │ │ • form       │ │ • language   │   │
//! │  │ • email/media│ │              │ │ • fee table  │ │ • phone ok   │   │
//! │  └──────────────┘ └──────────────┘ └──────────────┘ └──────────────┘   │
//! │                                                                         │
//! │  ConfigState is read-only and shared by all of them.                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod commands;
pub mod error;
pub mod services;
pub mod state;
pub mod telemetry;

use std::path::PathBuf;
use std::sync::Arc;

use thiserror::Error;
use tracing::{info, warn};

use services::{LocalAuthProvider, LocalMediaStore, LogEmailDispatcher, Services};
use state::{CartState, CheckoutState, ConfigError, ConfigState, SessionState};
use zari_db::{Database, DbConfig, DbError};

/// Startup failures.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Database(#[from] DbError),

    #[error("Could not determine the data directory; set ZARI_DB_PATH")]
    NoDataDir,

    #[error("I/O error during startup: {0}")]
    Io(#[from] std::io::Error),
}

/// Everything a running storefront holds.
pub struct Storefront {
    pub config: ConfigState,
    pub services: Services,
    pub session: SessionState,
    pub cart: CartState,
    pub checkout: CheckoutState,
    db: Database,
}

impl Storefront {
    /// Opens the database and builds the session state.
    ///
    /// ## Startup Sequence
    /// ```text
    /// 1. Resolve the SQLite path (config, ZARI_DB_PATH, platform data dir)
    /// 2. Connect and run pending migrations
    /// 3. Wire collaborators: SQLite stores, local auth, logged email,
    ///    media on disk
    /// 4. Restore the saved cart against current stock
    /// ```
    pub async fn start(config: ConfigState) -> Result<Self, StartupError> {
        let db_path: PathBuf = config.database_path().ok_or(StartupError::NoDataDir)?;
        info!(db_path = %db_path.display(), "Database path determined");
        if let Some(parent) = db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }

        let db = Database::new(
            DbConfig::new(db_path).max_connections(config.database.max_connections),
        )
        .await?;
        info!("Database connected and migrations applied");

        let services = Services::new(
            db.clone(),
            Arc::new(LocalAuthProvider::signed_out()),
            Arc::new(LogEmailDispatcher::new(config.email.service_id.clone())),
            Arc::new(LocalMediaStore::new(
                config.media_dir(),
                config.media.base_url.clone(),
            )),
        );

        let storefront = Storefront {
            session: SessionState::new(config.store.default_language),
            cart: CartState::new(config.pricing.max_cart_lines),
            checkout: CheckoutState::new(),
            services,
            config,
            db,
        };

        let restored = commands::cart::restore_cart(
            &storefront.services,
            &storefront.cart,
            &storefront.config,
        )
        .await;
        match restored {
            Ok(report) => info!(lines = report.restored, "Cart restored"),
            Err(e) => warn!(error = %e, "Saved cart could not be restored, starting empty"),
        }

        Ok(storefront)
    }

    /// Saves the cart and closes the database.
    pub async fn shutdown(self) {
        match commands::cart::save_cart(&self.cart, &self.config).await {
            Ok(true) => info!("Cart saved"),
            Ok(false) => {}
            Err(e) => warn!(error = %e, "Cart could not be saved"),
        }
        self.db.close().await;
        info!("Storefront stopped");
    }
}

/// Runs the storefront until Ctrl-C.
pub async fn run() -> Result<(), StartupError> {
    let config = ConfigState::load(None)?;
    telemetry::init_tracing(&config.logging.filter);

    info!(store = %config.store.name, "Starting Zari storefront");
    let storefront = Storefront::start(config).await?;

    tokio::signal::ctrl_c().await?;
    info!("Shutdown requested");
    storefront.shutdown().await;
    Ok(())
}
