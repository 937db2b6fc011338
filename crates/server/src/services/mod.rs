//! Business logic services.
//!
//! # Services
//!
//! - `identity` - Bearer credential to caller id
//! - `maps` - Geocoding and driving distances (Google Maps)
//! - `guard` - Caller existence and ownership checks
//! - `farms` - The farm report engine tying the above together

pub mod farms;
pub mod guard;
pub mod identity;
pub mod maps;

pub use farms::{
    Collaborators, CreateFarm, DeleteFarm, FarmError, FarmReportEngine, FarmReportQuery,
};
pub use guard::OwnershipGuard;
pub use identity::{IdentityError, IdentityResolver, JwtIdentityResolver};
pub use maps::{DistanceProvider, Geocoder, GoogleMapsClient, MapsError, geocode_or_origin};
