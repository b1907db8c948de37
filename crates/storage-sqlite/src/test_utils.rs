//! Temporary database fixtures for repository tests.

use chrono::Utc;
use diesel::prelude::*;
use rust_decimal::Decimal;
use std::sync::Arc;
use tempfile::TempDir;

use vaultfolio_core::assets::{Asset, AssetType, PricePoint};

use crate::assets::AssetDB;
use crate::db::{create_pool, get_connection, init, run_migrations, spawn_writer, DbPool, WriteHandle};
use crate::schema::{assets, users};

/// A migrated database in a temp dir with a running writer. Keep the value
/// alive for the duration of the test; dropping it deletes the file.
pub struct TestDb {
    pub pool: Arc<DbPool>,
    pub writer: WriteHandle,
    _dir: TempDir,
}

impl TestDb {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("Failed to create temp directory");
        let path = dir.path().join("test.db").to_string_lossy().to_string();
        let path = init(&path).expect("Failed to init database");
        let pool = create_pool(&path).expect("Failed to create pool");
        run_migrations(&pool).expect("Failed to run migrations");
        let writer = spawn_writer((*pool).clone());
        Self {
            pool,
            writer,
            _dir: dir,
        }
    }

    pub fn seed_user(&self, id: &str, balance: Decimal) {
        let now = Utc::now().naive_utc();
        let mut conn = get_connection(&self.pool).expect("Failed to get connection");
        diesel::insert_into(users::table)
            .values((
                users::id.eq(id),
                users::email.eq(format!("{}@example.com", id)),
                users::name.eq(id),
                users::balance.eq(balance.to_string()),
                users::role.eq("USER"),
                users::created_at.eq(now),
                users::updated_at.eq(now),
            ))
            .execute(&mut conn)
            .expect("Failed to seed user");
    }

    pub fn seed_asset(&self, id: &str, price: Decimal) -> Asset {
        let now = Utc::now().naive_utc();
        let asset = Asset {
            id: id.to_string(),
            name: id.to_string(),
            symbol: id.to_uppercase(),
            asset_type: AssetType::Gold,
            current_price: price,
            min_investment: Decimal::ZERO,
            price_history: vec![PricePoint {
                timestamp: now,
                price,
            }],
            is_active: true,
            version: 0,
            created_at: now,
            updated_at: now,
        };
        let mut conn = get_connection(&self.pool).expect("Failed to get connection");
        diesel::insert_into(assets::table)
            .values(AssetDB::try_from(&asset).expect("Failed to convert asset"))
            .execute(&mut conn)
            .expect("Failed to seed asset");
        asset
    }

    pub fn balance_of(&self, id: &str) -> Decimal {
        let mut conn = get_connection(&self.pool).expect("Failed to get connection");
        let stored = users::table
            .find(id)
            .select(users::balance)
            .first::<String>(&mut conn)
            .expect("Failed to read balance");
        stored.parse().expect("Failed to parse balance")
    }
}
