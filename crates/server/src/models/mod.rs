//! Domain models.
//!
//! These types represent validated domain objects separate from database row types.

pub mod farm;
pub mod report;
pub mod user;

pub use farm::{Farm, NewFarm, RemovedFarm};
pub use report::ReportRow;
pub use user::User;
