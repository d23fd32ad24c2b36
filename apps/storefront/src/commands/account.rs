//! # Account Commands
//!
//! Phone verification, the saved profile and the newsletter list.
//!
//! ## Phone Change Flow
//! ```text
//! send_phone_code(phone) ──► code sent to +971 phone
//!        │
//! verify_phone_code(phone, code) ──► session remembers the verified number
//!        │
//! save_profile(profile) ──► phone differs from stored one?
//!                              ├── matches verified number ─► saved
//!                              └── otherwise ─► UNAUTHORIZED
//! ```

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use tracing::{debug, info, warn};
use zari_core::validation::{
    normalize_subscriber_email, validate_otp_code, validate_phone,
};
use zari_core::{Profile, PHONE_COUNTRY_CODE};

use super::signed_in_user;
use crate::error::{ApiError, ApiResult};
use crate::services::Services;
use crate::state::{CheckoutState, SessionState};

fn international(digits: &str) -> String {
    format!("{}{}", PHONE_COUNTRY_CODE, digits)
}

/// Sends a one-time code to a UAE mobile number.
pub async fn send_phone_code(services: &Services, phone: String) -> ApiResult<()> {
    let digits = validate_phone(&phone)?;
    debug!(phone = %digits, "send_phone_code command");
    services.auth.send_phone_code(&international(&digits)).await?;
    Ok(())
}

/// Checks a one-time code. On success the number counts as verified for
/// the rest of the session.
pub async fn verify_phone_code(
    services: &Services,
    session: &SessionState,
    phone: String,
    code: String,
) -> ApiResult<()> {
    let digits = validate_phone(&phone)?;
    let code = validate_otp_code(&code)?;
    debug!(phone = %digits, "verify_phone_code command");

    if !services
        .auth
        .verify_phone_code(&international(&digits), &code)
        .await?
    {
        warn!(phone = %digits, "Phone code rejected");
        return Err(ApiError::validation("Invalid or expired code"));
    }

    session.mark_phone_verified(&digits);
    Ok(())
}

pub async fn get_profile(
    services: &Services,
    session: &SessionState,
) -> ApiResult<Option<Profile>> {
    let user = signed_in_user(services, session).await?;
    debug!(user_id = %user.id, "get_profile command");
    Ok(services.profiles.profile(&user.id).await?)
}

/// Saves name, phone and address for the signed-in shopper.
///
/// A new phone number must have been verified in this session.
pub async fn save_profile(
    services: &Services,
    session: &SessionState,
    profile: Profile,
) -> ApiResult<Profile> {
    let user = signed_in_user(services, session).await?;
    debug!(user_id = %user.id, "save_profile command");

    let phone = match profile.phone.trim() {
        "" => String::new(),
        raw => validate_phone(raw)?,
    };

    let stored_phone = services
        .profiles
        .profile(&user.id)
        .await?
        .map(|p| p.phone)
        .unwrap_or_default();

    let verified = session.verified_phone().as_deref() == Some(phone.as_str());
    if !phone.is_empty() && phone != stored_phone && !verified {
        return Err(ApiError::unauthorized("Verify the new phone number first"));
    }

    let saved = services
        .profiles
        .save_profile(&Profile {
            id: user.id.clone(),
            full_name: profile.full_name.trim().to_string(),
            phone,
            emirate: profile.emirate.trim().to_string(),
            city: profile.city.trim().to_string(),
            street: profile.street.trim().to_string(),
            villa: profile.villa.trim().to_string(),
            ..profile
        })
        .await?;

    info!(user_id = %user.id, "Profile saved");
    Ok(saved)
}

/// Adds an address to the newsletter.
///
/// ## Returns
/// `false` when it was already subscribed.
pub async fn subscribe(
    services: &Services,
    email: String,
    phone: Option<String>,
) -> ApiResult<bool> {
    let email = normalize_subscriber_email(&email)?;
    let phone = match phone.as_deref().map(str::trim) {
        None | Some("") => None,
        Some(raw) => Some(validate_phone(raw)?),
    };
    debug!(email = %email, "subscribe command");

    let token = STANDARD.encode(email.as_bytes());
    let added = services.subscribers.subscribe(&email, phone, &token).await?;
    if added {
        info!(email = %email, "Newsletter subscription added");
    }
    Ok(added)
}

/// Removes an address from the newsletter. Unknown addresses are not an error.
pub async fn unsubscribe(services: &Services, email: String) -> ApiResult<bool> {
    let email = normalize_subscriber_email(&email)?;
    debug!(email = %email, "unsubscribe command");
    Ok(services.subscribers.unsubscribe_email(&email).await?)
}

/// Ends the shopper's session.
///
/// The open checkout and its prefilled details are dropped. The cart stays
/// on the device.
pub async fn sign_out(
    services: &Services,
    session: &SessionState,
    checkout: &CheckoutState,
) -> ApiResult<()> {
    debug!("sign_out command");
    services.auth.sign_out().await?;
    let user_id = session.user().map(|u| u.id);
    session.reset();
    checkout.reset();
    info!(user_id = ?user_id, "Signed out");
    Ok(())
}

/// Removes the subscriber a newsletter unsubscribe link points at.
pub async fn unsubscribe_by_token(services: &Services, token: String) -> ApiResult<bool> {
    let token = token.trim();
    if token.is_empty() {
        return Err(ApiError::validation("Unsubscribe link is invalid"));
    }
    debug!("unsubscribe_by_token command");
    Ok(services.subscribers.unsubscribe_token(token).await?)
}
