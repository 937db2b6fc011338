//! User domain types.

use chrono::{DateTime, Utc};

use farm_report_core::{Coordinates, Email, UserId};

/// A registered user (domain type).
///
/// Users are created by the registration flow; this service only reads them
/// to resolve callers and their home address.
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    /// Unique user ID.
    pub id: UserId,
    /// Unique email, shown as the report "owner".
    pub email: Email,
    /// Free-text home address, used as the distance destination.
    pub address: String,
    /// Geocoded home address, when known.
    pub coordinates: Option<Coordinates>,
    /// When the user was created.
    pub created_at: DateTime<Utc>,
    /// When the user was last updated.
    pub updated_at: DateTime<Utc>,
}
