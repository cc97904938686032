use async_trait::async_trait;

use crate::repository::StoreError;

/// Outbound notification port. Delivery is fire-and-forget: callers log
/// failures and move on, they never roll back a transition over a lost mail.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), StoreError>;
}

/// Development mailer that writes messages to the log instead of a wire.
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), StoreError> {
        tracing::info!(to, subject, "outbound mail: {}", body);
        Ok(())
    }
}
