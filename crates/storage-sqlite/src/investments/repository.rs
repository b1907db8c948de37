use diesel::prelude::*;
use diesel::r2d2::{self, Pool};
use diesel::sqlite::SqliteConnection;
use std::sync::Arc;

use vaultfolio_core::errors::{Error, Result};
use vaultfolio_core::investments::{Investment, InvestmentFilter, InvestmentRepositoryTrait};

use super::model::InvestmentDB;
use crate::db::get_connection;
use crate::errors::IntoCore;
use crate::schema::investments;

/// Read side of investments. Writes go through the ledger store.
pub struct InvestmentRepository {
    pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>,
}

impl InvestmentRepository {
    pub fn new(pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>) -> Self {
        Self { pool }
    }
}

impl InvestmentRepositoryTrait for InvestmentRepository {
    fn get_by_id(&self, investment_id: &str) -> Result<Investment> {
        let mut conn = get_connection(&self.pool)?;
        let row = investments::table
            .find(investment_id)
            .select(InvestmentDB::as_select())
            .first::<InvestmentDB>(&mut conn)
            .optional()
            .into_core()?
            .ok_or_else(|| Error::not_found("Investment", investment_id))?;
        Ok(Investment::try_from(row)?)
    }

    fn list(&self, filter: &InvestmentFilter) -> Result<Vec<Investment>> {
        let mut conn = get_connection(&self.pool)?;
        let mut query = investments::table
            .select(InvestmentDB::as_select())
            .into_boxed();
        if let Some(user_id) = &filter.user_id {
            query = query.filter(investments::user_id.eq(user_id.clone()));
        }
        if let Some(asset_id) = &filter.asset_id {
            query = query.filter(investments::asset_id.eq(asset_id.clone()));
        }
        if let Some(states) = &filter.states {
            let states: Vec<&str> = states.iter().map(|s| s.as_db_str()).collect();
            query = query.filter(investments::state.eq_any(states));
        }
        let rows = query
            .order(investments::created_at.desc())
            .load::<InvestmentDB>(&mut conn)
            .into_core()?;
        Ok(rows
            .into_iter()
            .map(Investment::try_from)
            .collect::<std::result::Result<Vec<_>, _>>()?)
    }
}
