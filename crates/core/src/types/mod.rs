//! Core types for farm records and yield reports.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod cohort;
pub mod coordinates;
pub mod distance;
pub mod email;
pub mod id;

pub use cohort::{Cohort, MAX_MEASURE, YIELD_THRESHOLD_RATIO, fleet_average, yield_threshold};
pub use coordinates::{Coordinates, CoordinatesError};
pub use distance::Distance;
pub use email::{Email, EmailError};
pub use id::*;
