//! In-memory store shared by the service tests.
//!
//! Implements every repository trait plus [`LedgerStoreTrait`] over one
//! mutex-guarded state, applying commits to a copy that only replaces the
//! state when every write and guard succeeded.

use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use crate::assets::{Asset, AssetRepositoryTrait, AssetService, AssetType, PricePoint};
use crate::auth::Role;
use crate::balances::{BalanceLedgerEntry, BalanceLedgerRepositoryTrait, BalanceService};
use crate::errors::{DatabaseError, Error, Result};
use crate::investments::{
    Investment, InvestmentFilter, InvestmentRepositoryTrait, InvestmentService, InvestmentState,
};
use crate::ledger::{
    CommitReceipt, EntityWrite, LedgerCommit, LedgerStoreTrait, TransactionWrite, Versioned,
};
use crate::notifications::{InAppNotification, MockNotificationSink, NotificationRepositoryTrait};
use crate::reconciliation::ReconciliationService;
use crate::settings::PlatformSettings;
use crate::transactions::{Transaction, TransactionRepositoryTrait, TransactionType};
use crate::users::{NewUser, User, UserRepositoryTrait};
use crate::withdrawals::{
    Withdrawal, WithdrawalRepositoryTrait, WithdrawalService, WithdrawalStatus,
};

#[derive(Clone, Default)]
pub struct State {
    pub users: HashMap<String, User>,
    pub assets: HashMap<String, Asset>,
    pub investments: HashMap<String, Investment>,
    pub withdrawals: HashMap<String, Withdrawal>,
    pub transactions: Vec<Transaction>,
    pub ledger: Vec<BalanceLedgerEntry>,
    pub notifications: Vec<InAppNotification>,
}

type Hook = Box<dyn FnOnce(&mut State) + Send>;

#[derive(Clone, Default)]
pub struct InMemoryStore {
    state: Arc<Mutex<State>>,
    before_commit: Arc<Mutex<VecDeque<Hook>>>,
    commits: Arc<Mutex<usize>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues `hook` to run against the state right before a commit, standing
    /// in for a concurrent writer that got there first. Each commit consumes
    /// one queued hook.
    pub fn before_next_commit(&self, hook: impl FnOnce(&mut State) + Send + 'static) {
        self.before_commit.lock().unwrap().push_back(Box::new(hook));
    }

    pub fn seed_user(&self, id: &str, balance: Decimal) -> User {
        self.insert_user(id, balance, Role::User)
    }

    pub fn seed_admin(&self, id: &str) -> User {
        self.insert_user(id, Decimal::ZERO, Role::Admin)
    }

    fn insert_user(&self, id: &str, balance: Decimal, role: Role) -> User {
        let now = Utc::now().naive_utc();
        let user = User {
            id: id.to_string(),
            email: format!("{}@example.com", id),
            name: id.to_string(),
            phone: None,
            balance,
            role,
            created_at: now,
            updated_at: now,
        };
        self.state
            .lock()
            .unwrap()
            .users
            .insert(id.to_string(), user.clone());
        user
    }

    pub fn seed_asset(&self, id: &str, price: Decimal, min_investment: Decimal) -> Asset {
        let now = Utc::now().naive_utc();
        let asset = Asset {
            id: id.to_string(),
            name: id.to_string(),
            symbol: id.to_uppercase(),
            asset_type: AssetType::Gold,
            current_price: price,
            min_investment,
            price_history: vec![PricePoint {
                timestamp: now,
                price,
            }],
            is_active: true,
            version: 0,
            created_at: now,
            updated_at: now,
        };
        self.state
            .lock()
            .unwrap()
            .assets
            .insert(id.to_string(), asset.clone());
        asset
    }

    pub fn balance_of(&self, user_id: &str) -> Decimal {
        self.state.lock().unwrap().users[user_id].balance
    }

    pub fn investment(&self, id: &str) -> Investment {
        self.state.lock().unwrap().investments[id].clone()
    }

    pub fn transactions(&self) -> Vec<Transaction> {
        self.state.lock().unwrap().transactions.clone()
    }

    pub fn ledger(&self) -> Vec<BalanceLedgerEntry> {
        self.state.lock().unwrap().ledger.clone()
    }

    pub fn commit_count(&self) -> usize {
        *self.commits.lock().unwrap()
    }

    pub fn with_state<T>(&self, f: impl FnOnce(&mut State) -> T) -> T {
        let mut state = self.state.lock().unwrap();
        f(&mut *state)
    }
}

fn apply_entity<T: Versioned + Clone>(
    table: &mut HashMap<String, T>,
    id_of: impl Fn(&T) -> String,
    write: EntityWrite<T>,
) -> Result<()> {
    match write {
        EntityWrite::Insert(record) => {
            let id = id_of(&record);
            if table.contains_key(&id) {
                return Err(Error::Database(DatabaseError::UniqueViolation(id)));
            }
            table.insert(id, record);
        }
        EntityWrite::Update {
            record,
            expected_version,
        } => {
            let id = id_of(&record);
            let stored = table
                .get(&id)
                .ok_or_else(|| Error::NotFound(format!("record {} not found", id)))?;
            if stored.version() != expected_version {
                return Err(Error::ConcurrentModification(format!(
                    "record {} is at version {}, expected {}",
                    id,
                    stored.version(),
                    expected_version
                )));
            }
            table.insert(id, record);
        }
    }
    Ok(())
}

fn apply_commit(state: &mut State, commit: LedgerCommit) -> Result<CommitReceipt> {
    if let Some(guard) = &commit.asset_guard {
        let asset = state
            .assets
            .get(&guard.asset_id)
            .ok_or_else(|| Error::not_found("Asset", &guard.asset_id))?;
        guard.check(asset.is_active, asset.version)?;
    }
    if let Some(write) = commit.asset {
        apply_entity(&mut state.assets, |a| a.id.clone(), write)?;
    }
    if let Some(write) = commit.investment {
        apply_entity(&mut state.investments, |i| i.id.clone(), write)?;
    }
    if let Some(write) = commit.withdrawal {
        apply_entity(&mut state.withdrawals, |w| w.id.clone(), write)?;
    }

    let now = Utc::now().naive_utc();
    let mut receipt = CommitReceipt::default();
    for change in commit.balance_changes {
        let user = state
            .users
            .get_mut(change.user_id())
            .ok_or_else(|| Error::not_found("User", change.user_id()))?;
        let balance = change.apply_to(user.balance)?;
        user.balance = balance;
        user.updated_at = now;
        state.ledger.push(BalanceLedgerEntry {
            id: uuid::Uuid::new_v4().to_string(),
            user_id: change.user_id().to_string(),
            delta: change.delta(),
            balance_after: balance,
            reason: change.reason(),
            reference_id: change.reference_id().map(str::to_string),
            created_at: now,
        });
        receipt.balances.insert(change.user_id().to_string(), balance);
    }

    for write in commit.transactions {
        match write {
            TransactionWrite::Insert(transaction) => state.transactions.push(transaction),
            TransactionWrite::SetStatus {
                transaction_id,
                status,
            } => {
                let transaction = state
                    .transactions
                    .iter_mut()
                    .find(|t| t.id == transaction_id)
                    .ok_or_else(|| Error::not_found("Transaction", &transaction_id))?;
                transaction.status = status;
                transaction.updated_at = now;
            }
        }
    }
    Ok(receipt)
}

#[async_trait]
impl LedgerStoreTrait for InMemoryStore {
    async fn commit(&self, commit: LedgerCommit) -> Result<CommitReceipt> {
        let hook = self.before_commit.lock().unwrap().pop_front();
        let mut state = self.state.lock().unwrap();
        if let Some(hook) = hook {
            hook(&mut *state);
        }
        let mut next = state.clone();
        let receipt = apply_commit(&mut next, commit)?;
        *state = next;
        *self.commits.lock().unwrap() += 1;
        Ok(receipt)
    }
}

#[async_trait]
impl UserRepositoryTrait for InMemoryStore {
    async fn create(&self, new_user: NewUser) -> Result<User> {
        let now = Utc::now().naive_utc();
        let user = User {
            id: new_user
                .id
                .unwrap_or_else(|| uuid::Uuid::new_v4().to_string()),
            email: new_user.email,
            name: new_user.name,
            phone: new_user.phone,
            balance: Decimal::ZERO,
            role: new_user.role,
            created_at: now,
            updated_at: now,
        };
        self.state
            .lock()
            .unwrap()
            .users
            .insert(user.id.clone(), user.clone());
        Ok(user)
    }

    fn get_by_id(&self, user_id: &str) -> Result<User> {
        self.state
            .lock()
            .unwrap()
            .users
            .get(user_id)
            .cloned()
            .ok_or_else(|| Error::not_found("User", user_id))
    }

    fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .users
            .values()
            .find(|u| u.email == email)
            .cloned())
    }

    fn list(&self, role: Option<Role>) -> Result<Vec<User>> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .users
            .values()
            .filter(|u| role.map_or(true, |r| u.role == r))
            .cloned()
            .collect())
    }
}

#[async_trait]
impl AssetRepositoryTrait for InMemoryStore {
    async fn create(&self, asset: Asset) -> Result<Asset> {
        let mut state = self.state.lock().unwrap();
        if state.assets.values().any(|a| a.symbol == asset.symbol) {
            return Err(Error::invalid_input(format!(
                "An asset with symbol {} already exists",
                asset.symbol
            )));
        }
        state.assets.insert(asset.id.clone(), asset.clone());
        Ok(asset)
    }

    fn get_by_id(&self, asset_id: &str) -> Result<Asset> {
        self.state
            .lock()
            .unwrap()
            .assets
            .get(asset_id)
            .cloned()
            .ok_or_else(|| Error::not_found("Asset", asset_id))
    }

    fn get_by_symbol(&self, symbol: &str) -> Result<Option<Asset>> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .assets
            .values()
            .find(|a| a.symbol == symbol)
            .cloned())
    }

    fn list(&self, is_active: Option<bool>) -> Result<Vec<Asset>> {
        let mut assets: Vec<Asset> = self
            .state
            .lock()
            .unwrap()
            .assets
            .values()
            .filter(|a| is_active.map_or(true, |active| a.is_active == active))
            .cloned()
            .collect();
        assets.sort_by(|a, b| a.symbol.cmp(&b.symbol));
        Ok(assets)
    }

    async fn deactivate(&self, asset_id: &str) -> Result<Asset> {
        let mut state = self.state.lock().unwrap();
        let open = state
            .investments
            .values()
            .filter(|i| i.asset_id == asset_id && !i.state.is_terminal())
            .count();
        if open > 0 {
            return Err(Error::InvalidState(format!(
                "asset {} still has {} open investments",
                asset_id, open
            )));
        }
        let asset = state
            .assets
            .get_mut(asset_id)
            .ok_or_else(|| Error::not_found("Asset", asset_id))?;
        asset.is_active = false;
        asset.version += 1;
        Ok(asset.clone())
    }
}

impl InvestmentRepositoryTrait for InMemoryStore {
    fn get_by_id(&self, investment_id: &str) -> Result<Investment> {
        self.state
            .lock()
            .unwrap()
            .investments
            .get(investment_id)
            .cloned()
            .ok_or_else(|| Error::not_found("Investment", investment_id))
    }

    fn list(&self, filter: &InvestmentFilter) -> Result<Vec<Investment>> {
        let mut investments: Vec<Investment> = self
            .state
            .lock()
            .unwrap()
            .investments
            .values()
            .filter(|i| filter.matches(i))
            .cloned()
            .collect();
        investments.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(investments)
    }
}

impl WithdrawalRepositoryTrait for InMemoryStore {
    fn get_by_id(&self, withdrawal_id: &str) -> Result<Withdrawal> {
        self.state
            .lock()
            .unwrap()
            .withdrawals
            .get(withdrawal_id)
            .cloned()
            .ok_or_else(|| Error::not_found("Withdrawal", withdrawal_id))
    }

    fn list(
        &self,
        user_id: Option<&str>,
        status: Option<WithdrawalStatus>,
    ) -> Result<Vec<Withdrawal>> {
        let mut withdrawals: Vec<Withdrawal> = self
            .state
            .lock()
            .unwrap()
            .withdrawals
            .values()
            .filter(|w| user_id.map_or(true, |id| w.user_id == id))
            .filter(|w| status.map_or(true, |s| w.status == s))
            .cloned()
            .collect();
        withdrawals.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(withdrawals)
    }

    fn pending_total(&self, user_id: &str) -> Result<Decimal> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .withdrawals
            .values()
            .filter(|w| w.user_id == user_id && w.status == WithdrawalStatus::Pending)
            .map(|w| w.amount)
            .sum())
    }
}

impl TransactionRepositoryTrait for InMemoryStore {
    fn get_by_id(&self, transaction_id: &str) -> Result<Transaction> {
        self.state
            .lock()
            .unwrap()
            .transactions
            .iter()
            .find(|t| t.id == transaction_id)
            .cloned()
            .ok_or_else(|| Error::not_found("Transaction", transaction_id))
    }

    fn list(
        &self,
        user_id: Option<&str>,
        transaction_type: Option<TransactionType>,
    ) -> Result<Vec<Transaction>> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .transactions
            .iter()
            .rev()
            .filter(|t| user_id.map_or(true, |id| t.user_id == id))
            .filter(|t| transaction_type.map_or(true, |tt| t.transaction_type == tt))
            .cloned()
            .collect())
    }
}

impl BalanceLedgerRepositoryTrait for InMemoryStore {
    fn list_by_user(&self, user_id: &str) -> Result<Vec<BalanceLedgerEntry>> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .ledger
            .iter()
            .rev()
            .filter(|e| e.user_id == user_id)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl NotificationRepositoryTrait for InMemoryStore {
    async fn create(&self, notification: InAppNotification) -> Result<InAppNotification> {
        self.state
            .lock()
            .unwrap()
            .notifications
            .push(notification.clone());
        Ok(notification)
    }

    fn list_for_user(&self, user_id: &str, unread_only: bool) -> Result<Vec<InAppNotification>> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .notifications
            .iter()
            .rev()
            .filter(|n| n.user_id == user_id && (!unread_only || !n.is_read))
            .cloned()
            .collect())
    }

    async fn mark_read(&self, user_id: &str, notification_id: &str) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        let notification = state
            .notifications
            .iter_mut()
            .find(|n| n.id == notification_id && n.user_id == user_id)
            .ok_or_else(|| Error::not_found("Notification", notification_id))?;
        notification.is_read = true;
        Ok(())
    }
}

/// Ids of investments in `state`, for assertions on state filters.
pub fn ids_in_state(store: &InMemoryStore, state: InvestmentState) -> Vec<String> {
    store.with_state(|s| {
        s.investments
            .values()
            .filter(|i| i.state == state)
            .map(|i| i.id.clone())
            .collect()
    })
}

pub const ADMIN_EMAIL: &str = "ops@example.com";

/// Every service wired to one in-memory store and one mock sink.
pub struct Platform {
    pub store: InMemoryStore,
    pub sink: MockNotificationSink,
    pub assets: AssetService,
    pub investments: InvestmentService,
    pub withdrawals: WithdrawalService,
    pub balances: BalanceService,
}

impl Platform {
    pub fn new() -> Self {
        Self::with_settings(PlatformSettings {
            admin_email: Some(ADMIN_EMAIL.to_string()),
            ..PlatformSettings::default()
        })
    }

    pub fn with_settings(settings: PlatformSettings) -> Self {
        let store = InMemoryStore::new();
        let sink = MockNotificationSink::new();
        let shared = Arc::new(store.clone());

        let reconciliation = Arc::new(ReconciliationService::new(shared.clone(), shared.clone()));
        let assets = AssetService::new(
            shared.clone(),
            shared.clone(),
            reconciliation,
            settings.clone(),
        );
        let investments = InvestmentService::new(
            shared.clone(),
            shared.clone(),
            shared.clone(),
            shared.clone(),
            Arc::new(sink.clone()),
            settings.clone(),
        );
        let withdrawals = WithdrawalService::new(
            shared.clone(),
            shared.clone(),
            shared.clone(),
            Arc::new(sink.clone()),
            settings,
        );
        let balances = BalanceService::new(
            shared.clone(),
            shared.clone(),
            shared,
            Arc::new(sink.clone()),
        );

        Self {
            store,
            sink,
            assets,
            investments,
            withdrawals,
            balances,
        }
    }
}
