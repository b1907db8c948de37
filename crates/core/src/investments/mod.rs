//! Investments module - the investment lifecycle state machine.

mod investment_state;
mod investments_model;
mod investments_service;
mod investments_traits;


pub use investment_state::{InvestmentAction, InvestmentState};
pub use investments_model::{Investment, InvestmentFilter, NewInvestment, PortfolioSummary};
pub use investments_service::InvestmentService;
pub use investments_traits::{InvestmentRepositoryTrait, InvestmentServiceTrait};
