//! Caller existence and farm ownership checks.

use farm_report_core::UserId;

use super::farms::FarmError;
use crate::db::UserDirectory;
use crate::models::{Farm, User};

/// Shared pre-checks for every farm operation. Performs lookups only.
#[derive(Clone, Copy)]
pub struct OwnershipGuard<'a> {
    users: &'a dyn UserDirectory,
}

impl<'a> OwnershipGuard<'a> {
    #[must_use]
    pub const fn new(users: &'a dyn UserDirectory) -> Self {
        Self { users }
    }

    /// Load the caller's user record.
    ///
    /// # Errors
    ///
    /// Returns `FarmError::UnknownCaller` if no user has this id.
    pub async fn ensure_caller_exists(&self, caller: UserId) -> Result<User, FarmError> {
        self.users
            .find_user(caller)
            .await?
            .ok_or(FarmError::UnknownCaller(caller))
    }

    /// Check that `caller` owns `farm`.
    ///
    /// # Errors
    ///
    /// Returns `FarmError::NotOwner` if the farm belongs to someone else.
    pub fn ensure_owner(farm: &Farm, caller: UserId) -> Result<(), FarmError> {
        if farm.owner_id == caller {
            Ok(())
        } else {
            Err(FarmError::NotOwner {
                caller,
                farm: farm.id,
            })
        }
    }
}
