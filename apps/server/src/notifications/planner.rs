//! Splits a notification intent into the deliveries the worker performs.

use vaultfolio_core::notifications::{
    DeliveryChannel, InAppNotification, Notification, Recipient,
};

use super::channel::OutboundMessage;

#[derive(Debug, Clone, PartialEq)]
pub enum Delivery {
    /// Stored for the user's inbox.
    InApp(InAppNotification),
    /// Needs the user's contact details before it can be sent.
    ToUser {
        user_id: String,
        channel: DeliveryChannel,
        subject: String,
        body: String,
    },
    /// Address already known.
    Direct(OutboundMessage),
}

pub fn plan_deliveries(notification: &Notification) -> Vec<Delivery> {
    let mut deliveries = Vec::with_capacity(notification.channels.len());
    for channel in &notification.channels {
        match (channel, &notification.recipient) {
            (DeliveryChannel::InApp, _) => {
                if let Some(stored) = InAppNotification::from_notification(notification) {
                    deliveries.push(Delivery::InApp(stored));
                }
            }
            (channel, Recipient::User { user_id }) => deliveries.push(Delivery::ToUser {
                user_id: user_id.clone(),
                channel: *channel,
                subject: notification.title.clone(),
                body: notification.message.clone(),
            }),
            (DeliveryChannel::Email, Recipient::Admin { email }) => {
                deliveries.push(Delivery::Direct(OutboundMessage {
                    channel: DeliveryChannel::Email,
                    address: email.clone(),
                    subject: notification.title.clone(),
                    body: notification.message.clone(),
                }))
            }
            (channel, Recipient::Admin { .. }) => {
                tracing::debug!("No {:?} address for admin notifications, skipping", channel);
            }
        }
    }
    deliveries
}
