//! Transactional email.

use async_trait::async_trait;
use mockall::automock;
use serde::{Deserialize, Serialize};
use tracing::info;

use super::StoreResult;

/// Template variables for one newsletter email.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailVars {
    pub to_email: String,
    pub to_name: String,
    pub subject: String,
    pub message: String,
    /// Unsubscribe token for the recipient.
    pub unsub_id: String,
}

#[automock]
#[async_trait]
pub trait EmailDispatcher: Send + Sync {
    async fn send(&self, template_id: &str, vars: &EmailVars) -> StoreResult<()>;
}

/// Writes each email to the log instead of sending it.
#[derive(Debug, Clone)]
pub struct LogEmailDispatcher {
    service_id: String,
}

impl LogEmailDispatcher {
    pub fn new(service_id: impl Into<String>) -> Self {
        LogEmailDispatcher {
            service_id: service_id.into(),
        }
    }
}

#[async_trait]
impl EmailDispatcher for LogEmailDispatcher {
    async fn send(&self, template_id: &str, vars: &EmailVars) -> StoreResult<()> {
        info!(
            service = %self.service_id,
            template = %template_id,
            to = %vars.to_email,
            subject = %vars.subject,
            "Email dispatched"
        );
        Ok(())
    }
}
