//! States of an investment and the single table of legal transitions.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::errors::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InvestmentState {
    /// Deposit submitted, waiting for an admin.
    Pending,
    Active,
    ClosureRequested,
    /// Terminal. The current value was credited to the owner's balance.
    Closed,
    /// Terminal. The deposit was refused; no resubmission path exists.
    Rejected,
}

/// Everything that can be done to an investment after it is created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InvestmentAction {
    Approve,
    Reject,
    RequestClosure,
    ApproveClosure,
    RejectClosure,
}

impl InvestmentState {
    pub const ALL: [InvestmentState; 5] = [
        InvestmentState::Pending,
        InvestmentState::Active,
        InvestmentState::ClosureRequested,
        InvestmentState::Closed,
        InvestmentState::Rejected,
    ];

    /// States that hold a live position, revalued on every price change.
    pub const OPEN_POSITIONS: [InvestmentState; 2] =
        [InvestmentState::Active, InvestmentState::ClosureRequested];

    pub const fn as_db_str(&self) -> &'static str {
        match self {
            InvestmentState::Pending => "PENDING",
            InvestmentState::Active => "ACTIVE",
            InvestmentState::ClosureRequested => "CLOSURE_REQUESTED",
            InvestmentState::Closed => "CLOSED",
            InvestmentState::Rejected => "REJECTED",
        }
    }

    pub fn from_db_str(s: &str) -> Option<Self> {
        match s {
            "PENDING" => Some(InvestmentState::Pending),
            "ACTIVE" => Some(InvestmentState::Active),
            "CLOSURE_REQUESTED" => Some(InvestmentState::ClosureRequested),
            "CLOSED" => Some(InvestmentState::Closed),
            "REJECTED" => Some(InvestmentState::Rejected),
            _ => None,
        }
    }

    /// Approved and not yet closed.
    pub fn is_active(&self) -> bool {
        matches!(
            self,
            InvestmentState::Active | InvestmentState::ClosureRequested
        )
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, InvestmentState::Closed | InvestmentState::Rejected)
    }

    /// Looks up the state `action` leads to, or fails with `InvalidState`.
    pub fn transition(self, action: InvestmentAction) -> Result<InvestmentState> {
        use InvestmentAction::*;
        use InvestmentState::*;

        match (self, action) {
            (Pending, Approve) => Ok(Active),
            (Pending, Reject) => Ok(Rejected),
            (Active, RequestClosure) => Ok(ClosureRequested),
            (ClosureRequested, ApproveClosure) => Ok(Closed),
            (ClosureRequested, RejectClosure) => Ok(Active),
            (state, action) => Err(Error::InvalidState(format!(
                "cannot {} an investment that is {}",
                action, state
            ))),
        }
    }
}

impl fmt::Display for InvestmentState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_db_str())
    }
}

impl fmt::Display for InvestmentAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            InvestmentAction::Approve => "approve",
            InvestmentAction::Reject => "reject",
            InvestmentAction::RequestClosure => "request closure of",
            InvestmentAction::ApproveClosure => "approve closure of",
            InvestmentAction::RejectClosure => "reject closure of",
        };
        f.write_str(s)
    }
}
