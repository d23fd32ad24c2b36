//! Shopper identity, saved profiles and the newsletter list.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use mockall::automock;
use rand::Rng;
use tracing::{debug, info};
use zari_core::{AuthUser, Profile, SavedAddress, Subscriber};
use zari_db::Database;

use super::{StoreError, StoreResult};

// =============================================================================
// Profiles
// =============================================================================

#[async_trait]
impl ProfileStore for Database {
    async fn profile(&self, user_id: &str) -> StoreResult<Option<Profile>> {
        Ok(self.profiles().get(user_id).await?)
    }

    async fn save_profile(&self, profile: &Profile) -> StoreResult<Profile> {
        Ok(self.profiles().upsert(profile).await?)
    }

    async fn save_address(&self, user_id: &str, address: &SavedAddress) -> StoreResult<()> {
        Ok(self.profiles().update_address(user_id, address).await?)
    }
}

#[automock]
#[async_trait]
pub trait ProfileStore: Send + Sync {
    async fn profile(&self, user_id: &str) -> StoreResult<Option<Profile>>;

    async fn save_profile(&self, profile: &Profile) -> StoreResult<Profile>;

    /// Replaces the saved address only; name and phone are left alone.
    async fn save_address(&self, user_id: &str, address: &SavedAddress) -> StoreResult<()>;
}

// =============================================================================
// Newsletter
// =============================================================================

#[async_trait]
impl SubscriberStore for Database {
    async fn subscribe(
        &self,
        email: &str,
        phone: Option<String>,
        unsub_token: &str,
    ) -> StoreResult<bool> {
        Ok(self
            .subscribers()
            .insert(email, phone.as_deref(), unsub_token)
            .await?)
    }

    async fn unsubscribe_email(&self, email: &str) -> StoreResult<bool> {
        Ok(self.subscribers().delete_by_email(email).await?)
    }

    async fn unsubscribe_token(&self, token: &str) -> StoreResult<bool> {
        Ok(self.subscribers().delete_by_token(token).await?)
    }

    async fn list_subscribers(&self) -> StoreResult<Vec<Subscriber>> {
        Ok(self.subscribers().list().await?)
    }
}

#[automock]
#[async_trait]
pub trait SubscriberStore: Send + Sync {
    /// `false` when the address was already on the list.
    async fn subscribe(
        &self,
        email: &str,
        phone: Option<String>,
        unsub_token: &str,
    ) -> StoreResult<bool>;

    async fn unsubscribe_email(&self, email: &str) -> StoreResult<bool>;

    async fn unsubscribe_token(&self, token: &str) -> StoreResult<bool>;

    async fn list_subscribers(&self) -> StoreResult<Vec<Subscriber>>;
}

// =============================================================================
// Auth
// =============================================================================

/// Session identity plus one-time phone codes.
#[automock]
#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// The signed-in shopper, if any.
    async fn current_user(&self) -> StoreResult<Option<AuthUser>>;

    /// Sends a one-time code to a full international number.
    async fn send_phone_code(&self, phone: &str) -> StoreResult<()>;

    /// `true` when `code` is the one last sent to `phone`.
    async fn verify_phone_code(&self, phone: &str, code: &str) -> StoreResult<bool>;

    async fn sign_out(&self) -> StoreResult<()>;
}

/// Auth provider for local runs.
///
/// The identity is set at construction and cleared by signing out. Codes are
/// written to the log instead of being texted, and each one can be used once.
#[derive(Debug, Default)]
pub struct LocalAuthProvider {
    user: Mutex<Option<AuthUser>>,
    pending: Mutex<HashMap<String, String>>,
}

impl LocalAuthProvider {
    pub fn signed_in(user: AuthUser) -> Self {
        LocalAuthProvider {
            user: Mutex::new(Some(user)),
            pending: Mutex::new(HashMap::new()),
        }
    }

    pub fn signed_out() -> Self {
        Self::default()
    }

    fn user(&self) -> StoreResult<std::sync::MutexGuard<'_, Option<AuthUser>>> {
        self.user
            .lock()
            .map_err(|_| StoreError::unavailable("auth", "identity lock poisoned"))
    }

    fn pending(&self) -> StoreResult<std::sync::MutexGuard<'_, HashMap<String, String>>> {
        self.pending
            .lock()
            .map_err(|_| StoreError::unavailable("auth", "code table lock poisoned"))
    }
}

fn one_time_code() -> String {
    format!("{:06}", rand::thread_rng().gen_range(0..1_000_000))
}

#[async_trait]
impl AuthProvider for LocalAuthProvider {
    async fn current_user(&self) -> StoreResult<Option<AuthUser>> {
        Ok(self.user()?.clone())
    }

    async fn send_phone_code(&self, phone: &str) -> StoreResult<()> {
        let code = one_time_code();
        self.pending()?.insert(phone.to_string(), code.clone());
        info!(phone = %phone, code = %code, "Phone verification code issued");
        Ok(())
    }

    async fn verify_phone_code(&self, phone: &str, code: &str) -> StoreResult<bool> {
        let mut pending = self.pending()?;
        let matches = pending.get(phone).is_some_and(|expected| expected == code);
        if matches {
            pending.remove(phone);
        }
        debug!(phone = %phone, verified = matches, "Phone code checked");
        Ok(matches)
    }

    async fn sign_out(&self) -> StoreResult<()> {
        *self.user()? = None;
        self.pending()?.clear();
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
