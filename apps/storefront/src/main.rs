//! # Zari Storefront Entry Point
//!
//! ## Startup Sequence
//! 1. Load configuration (`storefront.toml`, then `ZARI_*` overrides)
//! 2. Initialize tracing
//! 3. Connect to the database & run migrations
//! 4. Create state objects and restore the saved cart
//! 5. Wait for Ctrl-C, then save the cart and close the database

#[tokio::main]
async fn main() {
    // The setup lives in lib.rs so tests can drive it.
    if let Err(e) = zari_storefront::run().await {
        eprintln!("zari-storefront: {e}");
        std::process::exit(1);
    }
}
