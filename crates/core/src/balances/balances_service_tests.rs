use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::auth::Principal;
use crate::balances::{
    AdjustmentMode, BalanceAdjustment, BalanceReason, BalanceServiceTrait,
};
use crate::errors::Error;
use crate::notifications::NotificationKind;
use crate::test_support::Platform;
use crate::transactions::{TransactionMetadata, TransactionStatus, TransactionType};

fn admin() -> Principal {
    Principal::admin("admin")
}

fn adjustment(mode: AdjustmentMode, amount: Decimal) -> BalanceAdjustment {
    BalanceAdjustment {
        mode,
        amount,
        reason: "support ticket 1182".to_string(),
    }
}

#[tokio::test]
async fn test_increase_and_decrease() {
    let p = Platform::new();
    p.store.seed_user("alice", dec!(100));

    let result = p
        .balances
        .adjust_balance(&admin(), "alice", adjustment(AdjustmentMode::Increase, dec!(25)))
        .await
        .unwrap();
    assert_eq!(result.delta, dec!(25));
    assert_eq!(result.balance, dec!(125));

    let result = p
        .balances
        .adjust_balance(&admin(), "alice", adjustment(AdjustmentMode::Decrease, dec!(125)))
        .await
        .unwrap();
    assert_eq!(result.delta, dec!(-125));
    assert_eq!(result.balance, Decimal::ZERO);
    assert_eq!(p.store.balance_of("alice"), Decimal::ZERO);
}

#[tokio::test]
async fn test_decrease_cannot_go_negative() {
    let p = Platform::new();
    p.store.seed_user("alice", dec!(10));

    let err = p
        .balances
        .adjust_balance(&admin(), "alice", adjustment(AdjustmentMode::Decrease, dec!(10.01)))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::InsufficientBalance { .. }));
    assert_eq!(p.store.balance_of("alice"), dec!(10));
    assert!(p.store.transactions().is_empty());
}

#[tokio::test]
async fn test_set_records_signed_delta_and_audit() {
    let p = Platform::new();
    p.store.seed_user("alice", dec!(340));

    let result = p
        .balances
        .adjust_balance(&admin(), "alice", adjustment(AdjustmentMode::Set, dec!(40)))
        .await
        .unwrap();
    assert_eq!(result.delta, dec!(-300));
    assert_eq!(result.balance, dec!(40));

    let transactions = p.store.transactions();
    assert_eq!(transactions.len(), 1);
    let tx = &transactions[0];
    assert_eq!(tx.id, result.transaction_id);
    assert_eq!(tx.transaction_type, TransactionType::AdminAdjustment);
    assert_eq!(tx.status, TransactionStatus::Completed);
    assert_eq!(tx.amount, dec!(-300));
    match &tx.metadata {
        TransactionMetadata::Adjustment(meta) => {
            assert_eq!(meta.admin_id, "admin");
            assert_eq!(meta.mode, AdjustmentMode::Set);
            assert_eq!(meta.requested_amount, dec!(40));
        }
        other => panic!("unexpected metadata {:?}", other),
    }

    let ledger = p.store.ledger();
    assert_eq!(ledger.len(), 1);
    assert_eq!(ledger[0].reason, BalanceReason::AdminAdjustment);
    assert_eq!(ledger[0].reference_id.as_deref(), Some(tx.id.as_str()));
    assert_eq!(ledger[0].balance_after, dec!(40));
}

#[tokio::test]
async fn test_set_retries_when_balance_moves_underneath() {
    let p = Platform::new();
    p.store.seed_user("alice", dec!(100));

    // A reconciliation credit lands between the read and the commit.
    p.store.before_next_commit(|s| {
        s.users.get_mut("alice").unwrap().balance += dec!(7);
    });

    let result = p
        .balances
        .adjust_balance(&admin(), "alice", adjustment(AdjustmentMode::Set, dec!(500)))
        .await
        .unwrap();
    assert_eq!(result.balance, dec!(500));
    assert_eq!(result.delta, dec!(393));
    assert_eq!(p.store.transactions().len(), 1);
}

#[tokio::test]
async fn test_adjustment_requires_admin_and_reason() {
    let p = Platform::new();
    p.store.seed_user("alice", dec!(100));

    let err = p
        .balances
        .adjust_balance(
            &Principal::user("alice"),
            "alice",
            adjustment(AdjustmentMode::Increase, dec!(1000)),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Unauthorized(_)));

    let mut no_reason = adjustment(AdjustmentMode::Increase, dec!(5));
    no_reason.reason = String::new();
    let err = p
        .balances
        .adjust_balance(&admin(), "alice", no_reason)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Validation(_)));
    assert_eq!(p.store.balance_of("alice"), dec!(100));
}

#[tokio::test]
async fn test_history_and_notification() {
    let p = Platform::new();
    p.store.seed_user("alice", Decimal::ZERO);

    for amount in [dec!(5), dec!(7)] {
        p.balances
            .adjust_balance(&admin(), "alice", adjustment(AdjustmentMode::Increase, amount))
            .await
            .unwrap();
    }

    let history = p
        .balances
        .get_balance_history(&Principal::user("alice"), "alice")
        .unwrap();
    let deltas: Vec<_> = history.iter().map(|e| e.delta).collect();
    assert_eq!(deltas, vec![dec!(7), dec!(5)]);
    assert_eq!(
        p.balances
            .get_balance(&Principal::user("alice"), "alice")
            .unwrap(),
        dec!(12)
    );
    assert!(matches!(
        p.balances.get_balance(&Principal::user("bob"), "alice"),
        Err(Error::Unauthorized(_))
    ));

    let notifications = p.sink.notifications();
    assert_eq!(notifications.len(), 2);
    assert!(notifications
        .iter()
        .all(|n| n.kind == NotificationKind::BalanceAdjusted));
}
