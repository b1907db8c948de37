use chrono::{NaiveDateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::constants::DISPLAY_DECIMAL_PRECISION;

/// Renders an amount for a notification message.
pub(crate) fn format_amount(amount: Decimal) -> String {
    format!(
        "{:.*}",
        DISPLAY_DECIMAL_PRECISION as usize,
        amount.round_dp(DISPLAY_DECIMAL_PRECISION)
    )
}

/// Lifecycle event a notification reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NotificationKind {
    DepositReceived,
    InvestmentApproved,
    InvestmentRejected,
    ClosureRequested,
    ClosureApproved,
    ClosureRejected,
    WithdrawalRequested,
    WithdrawalCompleted,
    WithdrawalRejected,
    BalanceAdjusted,
}

impl NotificationKind {
    pub const fn as_db_str(&self) -> &'static str {
        match self {
            NotificationKind::DepositReceived => "DEPOSIT_RECEIVED",
            NotificationKind::InvestmentApproved => "INVESTMENT_APPROVED",
            NotificationKind::InvestmentRejected => "INVESTMENT_REJECTED",
            NotificationKind::ClosureRequested => "CLOSURE_REQUESTED",
            NotificationKind::ClosureApproved => "CLOSURE_APPROVED",
            NotificationKind::ClosureRejected => "CLOSURE_REJECTED",
            NotificationKind::WithdrawalRequested => "WITHDRAWAL_REQUESTED",
            NotificationKind::WithdrawalCompleted => "WITHDRAWAL_COMPLETED",
            NotificationKind::WithdrawalRejected => "WITHDRAWAL_REJECTED",
            NotificationKind::BalanceAdjusted => "BALANCE_ADJUSTED",
        }
    }

    pub fn from_db_str(s: &str) -> Option<Self> {
        match s {
            "DEPOSIT_RECEIVED" => Some(NotificationKind::DepositReceived),
            "INVESTMENT_APPROVED" => Some(NotificationKind::InvestmentApproved),
            "INVESTMENT_REJECTED" => Some(NotificationKind::InvestmentRejected),
            "CLOSURE_REQUESTED" => Some(NotificationKind::ClosureRequested),
            "CLOSURE_APPROVED" => Some(NotificationKind::ClosureApproved),
            "CLOSURE_REJECTED" => Some(NotificationKind::ClosureRejected),
            "WITHDRAWAL_REQUESTED" => Some(NotificationKind::WithdrawalRequested),
            "WITHDRAWAL_COMPLETED" => Some(NotificationKind::WithdrawalCompleted),
            "WITHDRAWAL_REJECTED" => Some(NotificationKind::WithdrawalRejected),
            "BALANCE_ADJUSTED" => Some(NotificationKind::BalanceAdjusted),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Recipient {
    User { user_id: String },
    Admin { email: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryChannel {
    InApp,
    Email,
    WhatsApp,
}

/// A fire-and-forget notification intent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub kind: NotificationKind,
    pub recipient: Recipient,
    pub title: String,
    pub message: String,
    /// Id of the investment, withdrawal or transaction the event is about.
    pub reference_id: Option<String>,
    pub channels: Vec<DeliveryChannel>,
    pub created_at: NaiveDateTime,
}

impl Notification {
    /// Users are told on every channel.
    pub fn to_user(
        user_id: &str,
        kind: NotificationKind,
        title: impl Into<String>,
        message: impl Into<String>,
        reference_id: Option<&str>,
    ) -> Self {
        Self {
            kind,
            recipient: Recipient::User {
                user_id: user_id.to_string(),
            },
            title: title.into(),
            message: message.into(),
            reference_id: reference_id.map(str::to_string),
            channels: vec![
                DeliveryChannel::InApp,
                DeliveryChannel::Email,
                DeliveryChannel::WhatsApp,
            ],
            created_at: Utc::now().naive_utc(),
        }
    }

    /// Admins are told by email only.
    pub fn to_admin(
        email: &str,
        kind: NotificationKind,
        title: impl Into<String>,
        message: impl Into<String>,
        reference_id: Option<&str>,
    ) -> Self {
        Self {
            kind,
            recipient: Recipient::Admin {
                email: email.to_string(),
            },
            title: title.into(),
            message: message.into(),
            reference_id: reference_id.map(str::to_string),
            channels: vec![DeliveryChannel::Email],
            created_at: Utc::now().naive_utc(),
        }
    }

    pub fn user_id(&self) -> Option<&str> {
        match &self.recipient {
            Recipient::User { user_id } => Some(user_id),
            Recipient::Admin { .. } => None,
        }
    }

    pub fn wants(&self, channel: DeliveryChannel) -> bool {
        self.channels.contains(&channel)
    }
}

/// A notification persisted for display inside the app.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InAppNotification {
    pub id: String,
    pub user_id: String,
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
    pub reference_id: Option<String>,
    pub is_read: bool,
    pub created_at: NaiveDateTime,
}

impl InAppNotification {
    /// None for admin notifications or ones that skip the in-app channel.
    pub fn from_notification(notification: &Notification) -> Option<Self> {
        if !notification.wants(DeliveryChannel::InApp) {
            return None;
        }
        let user_id = notification.user_id()?;
        Some(Self {
            id: uuid::Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            kind: notification.kind,
            title: notification.title.clone(),
            message: notification.message.clone(),
            reference_id: notification.reference_id.clone(),
            is_read: false,
            created_at: notification.created_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_admin_notifications_are_not_stored_in_app() {
        let n = Notification::to_admin(
            "ops@example.com",
            NotificationKind::ClosureRequested,
            "Closure requested",
            "inv-1",
            Some("inv-1"),
        );
        assert!(InAppNotification::from_notification(&n).is_none());

        let n = Notification::to_user(
            "u1",
            NotificationKind::ClosureApproved,
            "Closure approved",
            "Your balance was credited",
            Some("inv-1"),
        );
        let stored = InAppNotification::from_notification(&n).unwrap();
        assert_eq!(stored.user_id, "u1");
        assert!(!stored.is_read);
    }

    #[test]
    fn test_format_amount_uses_two_places() {
        assert_eq!(format_amount(Decimal::new(12, 0)), "12.00");
        assert_eq!(format_amount(Decimal::new(110005, 4)), "11.00");
    }
}
