//! Farm domain types.

use rust_decimal::Decimal;
use serde::Serialize;

use farm_report_core::{Coordinates, FarmId, UserId};

/// A persisted farm.
///
/// Ownership is fixed at creation and never transferred; farms are never
/// updated in place.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Farm {
    pub id: FarmId,
    pub name: String,
    pub address: String,
    /// Geocoded once at creation time.
    pub coordinates: Coordinates,
    /// Hectares.
    pub size: Decimal,
    #[serde(rename = "yield")]
    pub farm_yield: Decimal,
    #[serde(rename = "owner")]
    pub owner_id: UserId,
}

impl Farm {
    /// Strip the identity of a farm that has just been deleted.
    #[must_use]
    pub fn into_removed(self) -> RemovedFarm {
        RemovedFarm {
            name: self.name,
            address: self.address,
            coordinates: self.coordinates,
            size: self.size,
            farm_yield: self.farm_yield,
            owner_id: self.owner_id,
        }
    }
}

/// Insert parameters for a farm. Coordinates are derived, never caller-supplied.
#[derive(Debug, Clone, PartialEq)]
pub struct NewFarm {
    pub owner_id: UserId,
    pub name: String,
    pub address: String,
    pub coordinates: Coordinates,
    pub size: Decimal,
    pub farm_yield: Decimal,
}

/// A farm as returned by a successful delete: the record without its id.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RemovedFarm {
    pub name: String,
    pub address: String,
    pub coordinates: Coordinates,
    pub size: Decimal,
    #[serde(rename = "yield")]
    pub farm_yield: Decimal,
    #[serde(rename = "owner")]
    pub owner_id: UserId,
}
