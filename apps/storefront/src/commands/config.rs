//! # Config Commands
//!
//! Store information for the frontend and the shopper's language choice.

use serde::Serialize;
use tracing::debug;
use zari_core::{Language, Money};

use crate::error::ApiResult;
use crate::state::{ConfigState, SessionState};

/// What the frontend needs to label prices and receipts.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreInfo {
    pub name: String,
    pub currency_code: String,
    pub pickup_label: String,
    pub site_url: String,
    pub gift_fee: Money,
    pub max_cart_lines: usize,
    /// Session language, falling back to the configured default.
    pub language: Language,
}

/// ## When Used
/// - App startup (to configure UI)
/// - Receipt display (store name, pickup label)
/// - Currency formatting
pub fn get_store_info(config: &ConfigState, session: &SessionState) -> StoreInfo {
    debug!("get_store_info command");
    StoreInfo {
        name: config.store.name.clone(),
        currency_code: config.store.currency_code.clone(),
        pickup_label: config.store.pickup_label.clone(),
        site_url: config.store.site_url.clone(),
        gift_fee: config.gift_fee(),
        max_cart_lines: config.pricing.max_cart_lines,
        language: session.language(),
    }
}

/// Switches between English and Arabic. Product names on orders placed
/// afterwards are captured in the new language.
pub fn set_language(session: &SessionState, language: String) -> ApiResult<Language> {
    debug!(language = %language, "set_language command");
    let language: Language = language.parse()?;
    session.set_language(language);
    Ok(language)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;

    #[test]
    fn test_store_info_defaults() {
        let info = get_store_info(&ConfigState::default(), &SessionState::new(Language::Ar));
        assert_eq!(info.name, "Zari");
        assert_eq!(info.currency_code, "AED");
        assert_eq!(info.pickup_label, "Pickup from Store");
        assert_eq!(info.gift_fee, Money::from_units(10));
        assert_eq!(info.language, Language::Ar);
    }

    #[test]
    fn test_set_language() {
        let session = SessionState::new(Language::En);
        assert_eq!(set_language(&session, "AR".to_string()), Ok(Language::Ar));
        assert_eq!(session.language(), Language::Ar);

        let err = set_language(&session, "fr".to_string()).unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
        assert_eq!(session.language(), Language::Ar);
    }
}
