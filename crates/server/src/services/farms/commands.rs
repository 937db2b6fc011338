//! Typed commands accepted by the engine.
//!
//! Commands are built by the HTTP layer after request validation, so field
//! values here are already checked: names and addresses are trimmed and
//! non-empty, `size` is positive and `farm_yield` is non-negative.

use rust_decimal::Decimal;

use farm_report_core::{Cohort, FarmId};

/// Create a farm owned by the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateFarm {
    /// Raw credential, e.g. `"Bearer <token>"`.
    pub credential: String,
    pub name: String,
    pub address: String,
    pub size: Decimal,
    pub farm_yield: Decimal,
}

/// Delete one of the caller's farms.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteFarm {
    pub credential: String,
    pub id: FarmId,
}

/// Request a yield report for one cohort.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FarmReportQuery {
    pub credential: String,
    pub cohort: Cohort,
}
