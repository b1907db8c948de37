//! Notifications module - intents emitted after successful lifecycle changes.
//!
//! Core only decides *what* to tell *whom*. Delivery (in-app storage, email,
//! WhatsApp) belongs to the sink the host application installs.

mod notifications_model;
mod notifications_service;
mod notifications_traits;
mod sink;

pub use notifications_model::{
    DeliveryChannel, InAppNotification, Notification, NotificationKind, Recipient,
};
pub use notifications_service::NotificationService;
pub use notifications_traits::{NotificationRepositoryTrait, NotificationServiceTrait};
pub(crate) use notifications_model::format_amount;
pub use sink::{MockNotificationSink, NoOpNotificationSink, NotificationSink};
