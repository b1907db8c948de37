use std::sync::Arc;

use crate::{
    config::Config,
    notifications::{
        notification_queue_worker, LoggingChannel, QueueWorkerDeps, QueuedNotificationSink,
    },
};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};
use vaultfolio_core::{
    assets::{AssetService, AssetServiceTrait},
    balances::{BalanceService, BalanceServiceTrait},
    investments::{InvestmentService, InvestmentServiceTrait},
    notifications::{NotificationService, NotificationServiceTrait, NotificationSink},
    reconciliation::ReconciliationService,
    transactions::{TransactionService, TransactionServiceTrait},
    users::{UserService, UserServiceTrait},
    withdrawals::{WithdrawalService, WithdrawalServiceTrait},
};
use vaultfolio_storage_sqlite::{
    db::{self, write_actor},
    AssetRepository, BalanceLedgerRepository, InvestmentRepository, LedgerStore,
    NotificationRepository, TransactionRepository, UserRepository, WithdrawalRepository,
};

pub struct AppState {
    pub user_service: Arc<dyn UserServiceTrait>,
    pub asset_service: Arc<dyn AssetServiceTrait>,
    pub investment_service: Arc<dyn InvestmentServiceTrait>,
    pub withdrawal_service: Arc<dyn WithdrawalServiceTrait>,
    pub balance_service: Arc<dyn BalanceServiceTrait>,
    pub transaction_service: Arc<dyn TransactionServiceTrait>,
    pub notification_service: Arc<dyn NotificationServiceTrait>,
    pub db_path: String,
}

pub fn init_tracing() {
    let log_format = std::env::var("VF_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    if log_format.eq_ignore_ascii_case("json") {
        registry
            .with(fmt::layer().json().with_current_span(false))
            .init();
    } else {
        registry
            .with(fmt::layer().with_target(true).with_line_number(true))
            .init();
    }
}

pub async fn build_state(config: &Config) -> anyhow::Result<Arc<AppState>> {
    let db_path = db::init(&config.db_path)?;
    tracing::info!("Database path in use: {}", db_path);

    let pool = db::create_pool(&db_path)?;
    db::run_migrations(&pool)?;
    let writer = write_actor::spawn_writer((*pool).clone());

    let settings = config.platform_settings();
    if settings.admin_email.is_none() {
        tracing::warn!("VF_ADMIN_EMAIL is not set, admin notifications are disabled");
    }

    let user_repository = Arc::new(UserRepository::new(pool.clone(), writer.clone()));
    let asset_repository = Arc::new(AssetRepository::new(pool.clone(), writer.clone()));
    let investment_repository = Arc::new(InvestmentRepository::new(pool.clone()));
    let withdrawal_repository = Arc::new(WithdrawalRepository::new(pool.clone()));
    let transaction_repository = Arc::new(TransactionRepository::new(pool.clone()));
    let ledger_repository = Arc::new(BalanceLedgerRepository::new(pool.clone()));
    let notification_repository =
        Arc::new(NotificationRepository::new(pool.clone(), writer.clone()));
    let ledger_store = Arc::new(LedgerStore::new(writer));

    // Notification sink: services emit into the queue, the worker delivers.
    let (sink, rx) = QueuedNotificationSink::new();
    let notification_sink: Arc<dyn NotificationSink> = Arc::new(sink);
    let worker_deps = Arc::new(QueueWorkerDeps {
        notification_repository: notification_repository.clone(),
        user_repository: user_repository.clone(),
        channel: Arc::new(LoggingChannel),
    });
    tokio::spawn(notification_queue_worker(rx, worker_deps));

    let reconciliation_service = Arc::new(ReconciliationService::new(
        investment_repository.clone(),
        ledger_store.clone(),
    ));
    let asset_service = Arc::new(AssetService::new(
        asset_repository.clone(),
        ledger_store.clone(),
        reconciliation_service,
        settings.clone(),
    ));
    let investment_service = Arc::new(InvestmentService::new(
        investment_repository,
        asset_repository,
        user_repository.clone(),
        ledger_store.clone(),
        notification_sink.clone(),
        settings.clone(),
    ));
    let withdrawal_service = Arc::new(WithdrawalService::new(
        withdrawal_repository,
        user_repository.clone(),
        ledger_store.clone(),
        notification_sink.clone(),
        settings,
    ));
    let balance_service = Arc::new(BalanceService::new(
        user_repository.clone(),
        ledger_repository,
        ledger_store,
        notification_sink,
    ));

    Ok(Arc::new(AppState {
        user_service: Arc::new(UserService::new(user_repository)),
        asset_service,
        investment_service,
        withdrawal_service,
        balance_service,
        transaction_service: Arc::new(TransactionService::new(transaction_repository)),
        notification_service: Arc::new(NotificationService::new(notification_repository)),
        db_path,
    }))
}
