//! # Configuration State
//!
//! Storefront settings loaded once at startup.
//!
//! ## Configuration Sources (Priority Order)
//! 1. Environment variables (`ZARI_*`)
//! 2. Config file (`storefront.toml` in the platform config dir, or `ZARI_CONFIG`)
//! 3. Defaults (this file)
//!
//! ## Thread Safety
//! Configuration is read-only after initialization, so no mutex needed.

use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};
use zari_core::money::CURRENCY_CODE;
use zari_core::{Language, Money, GIFT_FEE, MAX_CART_ITEMS, PICKUP_ADDRESS, STORE_NAME};

/// File name looked up in the platform config directory.
pub const CONFIG_FILE_NAME: &str = "storefront.toml";

/// Default log filter when neither `RUST_LOG` nor the config sets one.
pub const DEFAULT_LOG_FILTER: &str = "info,zari=debug,sqlx=warn";

/// Configuration error types.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Invalid value for {0}")]
    InvalidValue(String),
}

// =============================================================================
// Sections
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreSection {
    /// Shown on receipts and emails.
    pub name: String,
    pub currency_code: String,
    /// Address written on pickup orders.
    pub pickup_label: String,
    pub default_language: Language,
    /// Public storefront URL, used in unsubscribe links.
    pub site_url: String,
}

impl Default for StoreSection {
    fn default() -> Self {
        StoreSection {
            name: STORE_NAME.to_string(),
            currency_code: CURRENCY_CODE.to_string(),
            pickup_label: PICKUP_ADDRESS.to_string(),
            default_language: Language::En,
            site_url: "http://localhost:3000".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PricingSection {
    /// Gift wrapping fee in fils.
    pub gift_fee_fils: i64,
    pub max_cart_lines: usize,
}

impl Default for PricingSection {
    fn default() -> Self {
        PricingSection {
            gift_fee_fils: GIFT_FEE.fils(),
            max_cart_lines: MAX_CART_ITEMS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseSection {
    /// SQLite file. `None` uses `zari.db` in the platform data dir.
    pub path: Option<PathBuf>,
    pub max_connections: u32,
}

impl Default for DatabaseSection {
    fn default() -> Self {
        DatabaseSection {
            path: None,
            max_connections: 5,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmailSection {
    pub service_id: String,
    pub template_id: String,
    pub public_key: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CartSection {
    /// Where the cart is mirrored between runs. `None` keeps it in memory.
    pub snapshot_path: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MediaSection {
    /// Upload directory. `None` uses `media/` in the platform data dir.
    pub dir: Option<PathBuf>,
    pub base_url: String,
}

impl Default for MediaSection {
    fn default() -> Self {
        MediaSection {
            dir: None,
            base_url: "http://localhost:3000/media".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    pub filter: String,
}

impl Default for LoggingSection {
    fn default() -> Self {
        LoggingSection {
            filter: DEFAULT_LOG_FILTER.to_string(),
        }
    }
}

// =============================================================================
// Config State
// =============================================================================

/// Storefront configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfigState {
    pub store: StoreSection,
    pub pricing: PricingSection,
    pub database: DatabaseSection,
    pub email: EmailSection,
    pub cart: CartSection,
    pub media: MediaSection,
    pub logging: LoggingSection,
}

impl ConfigState {
    /// Loads configuration from file and environment.
    ///
    /// A missing file is not an error; defaults fill every unset key.
    pub fn load(explicit_path: Option<&Path>) -> Result<Self, ConfigError> {
        let path = explicit_path
            .map(Path::to_path_buf)
            .or_else(|| std::env::var_os("ZARI_CONFIG").map(PathBuf::from))
            .or_else(|| project_dirs().map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME)));

        let mut config = match path {
            Some(path) if path.exists() => {
                let text = std::fs::read_to_string(&path).map_err(|source| ConfigError::Read {
                    path: path.clone(),
                    source,
                })?;
                let config = Self::from_toml(&text).map_err(|source| ConfigError::Parse {
                    path: path.clone(),
                    source,
                })?;
                info!(path = %path.display(), "Loaded config file");
                config
            }
            _ => {
                debug!("No config file found, using defaults");
                ConfigState::default()
            }
        };

        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    pub fn from_toml(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    /// Applies `ZARI_*` overrides read through `lookup`.
    ///
    /// ## Environment Variables
    /// - `ZARI_STORE_NAME`, `ZARI_SITE_URL`, `ZARI_LANGUAGE`
    /// - `ZARI_GIFT_FEE_FILS`, `ZARI_MAX_CART_LINES`
    /// - `ZARI_DB_PATH`, `ZARI_DB_MAX_CONNECTIONS`
    /// - `ZARI_EMAIL_SERVICE_ID`, `ZARI_EMAIL_TEMPLATE_ID`, `ZARI_EMAIL_PUBLIC_KEY`
    /// - `ZARI_CART_SNAPSHOT`, `ZARI_MEDIA_DIR`, `ZARI_MEDIA_BASE_URL`
    /// - `ZARI_LOG`
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(name) = lookup("ZARI_STORE_NAME") {
            self.store.name = name;
        }
        if let Some(url) = lookup("ZARI_SITE_URL") {
            self.store.site_url = url;
        }
        if let Some(lang) = lookup("ZARI_LANGUAGE") {
            self.store.default_language = lang
                .parse()
                .map_err(|_| ConfigError::InvalidValue("ZARI_LANGUAGE".to_string()))?;
        }
        if let Some(fee) = lookup("ZARI_GIFT_FEE_FILS") {
            self.pricing.gift_fee_fils = parse_env("ZARI_GIFT_FEE_FILS", &fee)?;
        }
        if let Some(max) = lookup("ZARI_MAX_CART_LINES") {
            self.pricing.max_cart_lines = parse_env("ZARI_MAX_CART_LINES", &max)?;
        }
        if let Some(path) = lookup("ZARI_DB_PATH") {
            self.database.path = Some(PathBuf::from(path));
        }
        if let Some(max) = lookup("ZARI_DB_MAX_CONNECTIONS") {
            self.database.max_connections = parse_env("ZARI_DB_MAX_CONNECTIONS", &max)?;
        }
        if let Some(id) = lookup("ZARI_EMAIL_SERVICE_ID") {
            self.email.service_id = id;
        }
        if let Some(id) = lookup("ZARI_EMAIL_TEMPLATE_ID") {
            self.email.template_id = id;
        }
        if let Some(key) = lookup("ZARI_EMAIL_PUBLIC_KEY") {
            self.email.public_key = key;
        }
        if let Some(path) = lookup("ZARI_CART_SNAPSHOT") {
            self.cart.snapshot_path = Some(PathBuf::from(path));
        }
        if let Some(dir) = lookup("ZARI_MEDIA_DIR") {
            self.media.dir = Some(PathBuf::from(dir));
        }
        if let Some(url) = lookup("ZARI_MEDIA_BASE_URL") {
            self.media.base_url = url;
        }
        if let Some(filter) = lookup("ZARI_LOG") {
            self.logging.filter = filter;
        }

        if self.pricing.gift_fee_fils < 0 {
            return Err(ConfigError::InvalidValue("pricing.gift_fee_fils".to_string()));
        }
        if self.pricing.max_cart_lines == 0 {
            return Err(ConfigError::InvalidValue("pricing.max_cart_lines".to_string()));
        }
        Ok(())
    }

    pub fn gift_fee(&self) -> Money {
        Money::from_fils(self.pricing.gift_fee_fils)
    }

    /// SQLite file, falling back to the platform data directory.
    pub fn database_path(&self) -> Option<PathBuf> {
        self.database
            .path
            .clone()
            .or_else(|| project_dirs().map(|dirs| dirs.data_dir().join("zari.db")))
    }

    /// Upload directory, falling back to the platform data directory.
    pub fn media_dir(&self) -> PathBuf {
        self.media
            .dir
            .clone()
            .or_else(|| project_dirs().map(|dirs| dirs.data_dir().join("media")))
            .unwrap_or_else(|| PathBuf::from("media"))
    }
}

fn parse_env<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::InvalidValue(key.to_string()))
}

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("ae", "zari", "storefront")
}
