//! # State Module
//!
//! Session state injected into command handlers.
//!
//! Instead of a single `AppState` struct, each concern gets its own state
//! type, and each command asks only for the ones it touches.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    State Architecture                                   │
//! │                                                                         │
//! │  ┌──────────────┐  ┌──────────────┐  ┌──────────────┐  ┌────────────┐  │
//! │  │ ConfigState  │  │  CartState   │  │CheckoutState │  │SessionState│  │
//! │  │              │  │              │  │              │  │            │  │
//! │  │  [store]     │  │  Cart        │  │  Checkout    │  │  user      │  │
//! │  │  [pricing]   │  │  coupon      │  │  SingleFlight│  │  language  │  │
//! │  │  [database]  │  │              │  │              │  │  phone ok  │  │
//! │  └──────────────┘  └──────────────┘  └──────────────┘  └────────────┘  │
//! │                                                                         │
//! │  THREAD SAFETY:                                                        │
//! │  • ConfigState: read-only after startup                                │
//! │  • Cart/Checkout/Session: Arc<Mutex<T>>, one writer at a time          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

mod cart;
mod checkout;
mod config;
mod flight;
mod session;

pub use cart::{CartSession, CartState, SnapshotError};
pub use checkout::CheckoutState;
pub use config::{ConfigError, ConfigState, CONFIG_FILE_NAME, DEFAULT_LOG_FILTER};
pub use flight::{FlightGuard, SingleFlight};
pub use session::SessionState;
