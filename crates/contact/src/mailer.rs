use crate::Notification;

/// Outbound mail transport.
#[async_trait::async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, notification: &Notification) -> anyhow::Result<()>;
}
