use async_trait::async_trait;
use vaultfolio_core::notifications::DeliveryChannel;

/// A message ready to leave the platform.
#[derive(Debug, Clone, PartialEq)]
pub struct OutboundMessage {
    pub channel: DeliveryChannel,
    /// Email address or phone number, depending on `channel`.
    pub address: String,
    pub subject: String,
    pub body: String,
}

/// Transport for email and WhatsApp messages.
#[async_trait]
pub trait NotificationChannel: Send + Sync {
    async fn send(&self, message: &OutboundMessage) -> anyhow::Result<()>;
}

/// Writes outbound messages to the log instead of sending them.
#[derive(Clone, Default)]
pub struct LoggingChannel;

#[async_trait]
impl NotificationChannel for LoggingChannel {
    async fn send(&self, message: &OutboundMessage) -> anyhow::Result<()> {
        tracing::info!(
            channel = ?message.channel,
            address = %message.address,
            "Outbound notification: {}",
            message.subject
        );
        Ok(())
    }
}
