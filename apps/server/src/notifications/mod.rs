//! Notification delivery for the web server.
//!
//! Core services hand notification intents to [`QueuedNotificationSink`],
//! which pushes them onto an unbounded channel. A single queue worker drains
//! the channel, stores in-app notifications and passes email and WhatsApp
//! messages to a [`NotificationChannel`]. Delivery failures are logged and
//! dropped; they never reach the request that caused them.

mod channel;
mod planner;
mod queue_worker;
mod sink;

pub use channel::{LoggingChannel, NotificationChannel, OutboundMessage};
pub use queue_worker::{notification_queue_worker, QueueWorkerDeps};
pub use sink::QueuedNotificationSink;
