//! Travel distance reported by the distance provider.

use serde::{Deserialize, Serialize};

/// A driving distance between two addresses.
///
/// `value` is in metres; `text` is the provider's human-readable rendering
/// (e.g. `"1,234 km"`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Distance {
    pub text: String,
    pub value: u64,
}

impl Distance {
    #[must_use]
    pub fn new(text: impl Into<String>, value: u64) -> Self {
        Self {
            text: text.into(),
            value,
        }
    }
}
