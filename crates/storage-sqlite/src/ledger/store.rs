use async_trait::async_trait;
use chrono::Utc;
use diesel::prelude::*;
use diesel::sqlite::SqliteConnection;
use log::debug;

use vaultfolio_core::balances::{BalanceChange, BalanceLedgerEntry};
use vaultfolio_core::errors::{Error, Result};
use vaultfolio_core::ledger::{
    AssetGuard, CommitReceipt, EntityWrite, LedgerCommit, LedgerStoreTrait, TransactionWrite,
};
use vaultfolio_core::{assets::Asset, investments::Investment, withdrawals::Withdrawal};

use crate::assets::AssetDB;
use crate::balances::BalanceLedgerEntryDB;
use crate::db::WriteHandle;
use crate::errors::StorageError;
use crate::investments::InvestmentDB;
use crate::schema::{assets, balance_ledger, investments, transactions, users, withdrawals};
use crate::transactions::TransactionDB;
use crate::utils::parse_decimal;
use crate::withdrawals::WithdrawalDB;

/// Applies [`LedgerCommit`]s on the writer actor.
///
/// Each commit is one writer job, so it runs inside a single `IMMEDIATE`
/// transaction: any failed version check, balance guard or insert rolls back
/// everything the commit wrote.
pub struct LedgerStore {
    writer: WriteHandle,
}

impl LedgerStore {
    pub fn new(writer: WriteHandle) -> Self {
        Self { writer }
    }
}

#[async_trait]
impl LedgerStoreTrait for LedgerStore {
    async fn commit(&self, commit: LedgerCommit) -> Result<CommitReceipt> {
        self.writer
            .exec(move |conn: &mut SqliteConnection| apply_commit(conn, commit))
            .await
    }
}

fn apply_commit(conn: &mut SqliteConnection, commit: LedgerCommit) -> Result<CommitReceipt> {
    if let Some(guard) = &commit.asset_guard {
        check_asset_guard(conn, guard)?;
    }
    if let Some(write) = commit.asset {
        write_asset(conn, write)?;
    }
    if let Some(write) = commit.investment {
        write_investment(conn, write)?;
    }
    if let Some(write) = commit.withdrawal {
        write_withdrawal(conn, write)?;
    }

    let mut receipt = CommitReceipt::default();
    for change in &commit.balance_changes {
        let balance = apply_balance_change(conn, change)?;
        receipt.balances.insert(change.user_id().to_string(), balance);
    }

    for write in commit.transactions {
        write_transaction(conn, write)?;
    }
    Ok(receipt)
}

fn check_asset_guard(conn: &mut SqliteConnection, guard: &AssetGuard) -> Result<()> {
    let (is_active, version) = assets::table
        .find(&guard.asset_id)
        .select((assets::is_active, assets::version))
        .first::<(bool, i64)>(conn)
        .optional()
        .map_err(StorageError::from)?
        .ok_or_else(|| Error::not_found("Asset", &guard.asset_id))?;
    guard.check(is_active, version)
}

/// Turns a zero-row CAS update into the right error.
fn stale_or_missing(entity: &str, id: &str, current: Option<i64>, expected: i64) -> Error {
    match current {
        None => Error::not_found(entity, id),
        Some(version) => {
            debug!(
                "{} {} CAS failed: stored version {}, expected {}",
                entity, id, version, expected
            );
            Error::ConcurrentModification(format!(
                "{} {} is at version {}, expected {}",
                entity, id, version, expected
            ))
        }
    }
}

fn write_asset(conn: &mut SqliteConnection, write: EntityWrite<Asset>) -> Result<()> {
    match write {
        EntityWrite::Insert(asset) => {
            diesel::insert_into(assets::table)
                .values(AssetDB::try_from(&asset)?)
                .execute(conn)
                .map_err(StorageError::from)?;
        }
        EntityWrite::Update {
            record,
            expected_version,
        } => {
            let row = AssetDB::try_from(&record)?;
            let updated = diesel::update(
                assets::table
                    .filter(assets::id.eq(&record.id))
                    .filter(assets::version.eq(expected_version)),
            )
            .set(&row)
            .execute(conn)
            .map_err(StorageError::from)?;
            if updated == 0 {
                let current = assets::table
                    .find(&record.id)
                    .select(assets::version)
                    .first::<i64>(conn)
                    .optional()
                    .map_err(StorageError::from)?;
                return Err(stale_or_missing("Asset", &record.id, current, expected_version));
            }
        }
    }
    Ok(())
}

fn write_investment(conn: &mut SqliteConnection, write: EntityWrite<Investment>) -> Result<()> {
    match write {
        EntityWrite::Insert(investment) => {
            diesel::insert_into(investments::table)
                .values(InvestmentDB::from(&investment))
                .execute(conn)
                .map_err(StorageError::from)?;
        }
        EntityWrite::Update {
            record,
            expected_version,
        } => {
            let row = InvestmentDB::from(&record);
            let updated = diesel::update(
                investments::table
                    .filter(investments::id.eq(&record.id))
                    .filter(investments::version.eq(expected_version)),
            )
            .set(&row)
            .execute(conn)
            .map_err(StorageError::from)?;
            if updated == 0 {
                let current = investments::table
                    .find(&record.id)
                    .select(investments::version)
                    .first::<i64>(conn)
                    .optional()
                    .map_err(StorageError::from)?;
                return Err(stale_or_missing(
                    "Investment",
                    &record.id,
                    current,
                    expected_version,
                ));
            }
        }
    }
    Ok(())
}

fn write_withdrawal(conn: &mut SqliteConnection, write: EntityWrite<Withdrawal>) -> Result<()> {
    match write {
        EntityWrite::Insert(withdrawal) => {
            diesel::insert_into(withdrawals::table)
                .values(WithdrawalDB::try_from(&withdrawal)?)
                .execute(conn)
                .map_err(StorageError::from)?;
        }
        EntityWrite::Update {
            record,
            expected_version,
        } => {
            let row = WithdrawalDB::try_from(&record)?;
            let updated = diesel::update(
                withdrawals::table
                    .filter(withdrawals::id.eq(&record.id))
                    .filter(withdrawals::version.eq(expected_version)),
            )
            .set(&row)
            .execute(conn)
            .map_err(StorageError::from)?;
            if updated == 0 {
                let current = withdrawals::table
                    .find(&record.id)
                    .select(withdrawals::version)
                    .first::<i64>(conn)
                    .optional()
                    .map_err(StorageError::from)?;
                return Err(stale_or_missing(
                    "Withdrawal",
                    &record.id,
                    current,
                    expected_version,
                ));
            }
        }
    }
    Ok(())
}

/// Reads the balance inside the transaction, applies the change under its
/// guard and appends the audit entry. Returns the new balance.
fn apply_balance_change(
    conn: &mut SqliteConnection,
    change: &BalanceChange,
) -> Result<rust_decimal::Decimal> {
    let user_id = change.user_id();
    let stored = users::table
        .find(user_id)
        .select(users::balance)
        .first::<String>(conn)
        .optional()
        .map_err(StorageError::from)?
        .ok_or_else(|| Error::not_found("User", user_id))?;
    let current = parse_decimal(&stored, "users.balance")?;
    let balance = change.apply_to(current)?;
    let now = Utc::now().naive_utc();

    diesel::update(users::table.find(user_id))
        .set((
            users::balance.eq(balance.to_string()),
            users::updated_at.eq(now),
        ))
        .execute(conn)
        .map_err(StorageError::from)?;

    let entry = BalanceLedgerEntry {
        id: uuid::Uuid::new_v4().to_string(),
        user_id: user_id.to_string(),
        delta: change.delta(),
        balance_after: balance,
        reason: change.reason(),
        reference_id: change.reference_id().map(str::to_string),
        created_at: now,
    };
    diesel::insert_into(balance_ledger::table)
        .values(BalanceLedgerEntryDB::from(&entry))
        .execute(conn)
        .map_err(StorageError::from)?;

    debug!(
        "Balance of {} moved by {} to {} ({})",
        user_id,
        change.delta(),
        balance,
        change.reason().as_db_str()
    );
    Ok(balance)
}

fn write_transaction(conn: &mut SqliteConnection, write: TransactionWrite) -> Result<()> {
    match write {
        TransactionWrite::Insert(transaction) => {
            diesel::insert_into(transactions::table)
                .values(TransactionDB::try_from(&transaction)?)
                .execute(conn)
                .map_err(StorageError::from)?;
        }
        TransactionWrite::SetStatus {
            transaction_id,
            status,
        } => {
            let updated = diesel::update(transactions::table.find(&transaction_id))
                .set((
                    transactions::status.eq(status.as_db_str()),
                    transactions::updated_at.eq(Utc::now().naive_utc()),
                ))
                .execute(conn)
                .map_err(StorageError::from)?;
            if updated == 0 {
                return Err(Error::not_found("Transaction", &transaction_id));
            }
        }
    }
    Ok(())
}
