//! Geographic coordinates derived from a free-text address.
//!
//! Coordinates travel over the wire as the string `"lat, lng"`, the same
//! rendering the service has always used for the persisted point.

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

/// Errors produced when parsing a `"lat, lng"` rendering.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum CoordinatesError {
    #[error("coordinates must have the form \"lat, lng\"")]
    Shape,
    #[error("invalid {axis}: {value}")]
    Number { axis: &'static str, value: String },
    #[error("{axis} out of range: {value}")]
    OutOfRange { axis: &'static str, value: String },
}

/// A latitude/longitude pair in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinates {
    /// Fallback used when an address cannot be geocoded.
    pub const ORIGIN: Self = Self { lat: 0.0, lng: 0.0 };

    /// Build coordinates, rejecting non-finite or out-of-range degrees.
    ///
    /// # Errors
    ///
    /// Returns [`CoordinatesError::OutOfRange`] if latitude is outside
    /// `[-90, 90]` or longitude is outside `[-180, 180]`.
    pub fn new(lat: f64, lng: f64) -> Result<Self, CoordinatesError> {
        if !lat.is_finite() || !(-90.0..=90.0).contains(&lat) {
            return Err(CoordinatesError::OutOfRange {
                axis: "latitude",
                value: lat.to_string(),
            });
        }
        if !lng.is_finite() || !(-180.0..=180.0).contains(&lng) {
            return Err(CoordinatesError::OutOfRange {
                axis: "longitude",
                value: lng.to_string(),
            });
        }
        Ok(Self { lat, lng })
    }
}

impl fmt::Display for Coordinates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, {}", self.lat, self.lng)
    }
}

impl FromStr for Coordinates {
    type Err = CoordinatesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (lat, lng) = s.split_once(',').ok_or(CoordinatesError::Shape)?;
        let parse = |axis: &'static str, raw: &str| {
            raw.trim()
                .parse::<f64>()
                .map_err(|_| CoordinatesError::Number {
                    axis,
                    value: raw.trim().to_owned(),
                })
        };
        Self::new(parse("latitude", lat)?, parse("longitude", lng)?)
    }
}

impl TryFrom<String> for Coordinates {
    type Error = CoordinatesError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Coordinates> for String {
    fn from(coordinates: Coordinates) -> Self {
        coordinates.to_string()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_origin_renders_as_zero_pair() {
        assert_eq!(Coordinates::ORIGIN.to_string(), "0, 0");
    }

    #[test]
    fn test_renders_lat_then_lng() {
        let c = Coordinates::new(48.1443, 17.1129).unwrap();
        assert_eq!(c.to_string(), "48.1443, 17.1129");
    }

    #[test]
    fn test_parse_tolerates_spacing() {
        let c: Coordinates = "40.7464,-73.9814".parse().unwrap();
        assert!((c.lat - 40.7464).abs() < f64::EPSILON);
        assert!((c.lng + 73.9814).abs() < f64::EPSILON);
    }

    #[test]
    fn test_parse_rejects_bad_input() {
        assert_eq!("48.1".parse::<Coordinates>(), Err(CoordinatesError::Shape));
        assert!(matches!(
            "north, 17".parse::<Coordinates>(),
            Err(CoordinatesError::Number { axis: "latitude", .. })
        ));
        assert!(matches!(
            "91, 17".parse::<Coordinates>(),
            Err(CoordinatesError::OutOfRange { axis: "latitude", .. })
        ));
    }

    #[test]
    fn test_serde_uses_string_form() {
        let c = Coordinates::new(-33.5, 151.25).unwrap();
        let json = serde_json::to_string(&c).unwrap();
        assert_eq!(json, "\"-33.5, 151.25\"");
        assert_eq!(serde_json::from_str::<Coordinates>(&json).unwrap(), c);
    }
}
