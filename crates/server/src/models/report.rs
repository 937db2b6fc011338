//! Yield report rows.

use rust_decimal::Decimal;
use serde::Serialize;

use farm_report_core::{Distance, Email};

/// One row of a yield report.
///
/// `driving_distance` is `None` when the distance provider failed or timed
/// out for this row, which is distinct from a real zero distance.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportRow {
    pub name: String,
    pub address: String,
    /// Email of the user who requested the report.
    pub owner: Email,
    pub size: Decimal,
    #[serde(rename = "yield")]
    pub farm_yield: Decimal,
    pub driving_distance: Option<Distance>,
}
