//! User repository for database operations.
//!
//! Users are owned by the registration flow. This service reads them to
//! resolve callers; the insert path exists for the seeder.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use farm_report_core::{Coordinates, Email, UserId};

use super::RepositoryError;
use crate::models::User;

/// Insert parameters for a user.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: Email,
    pub hashed_password: String,
    pub address: String,
    pub coordinates: Option<Coordinates>,
}

/// Internal row type for user queries.
#[derive(Debug, sqlx::FromRow)]
struct UserRow {
    id: Uuid,
    email: String,
    address: String,
    lat: Option<f64>,
    lng: Option<f64>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = RepositoryError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let email = Email::parse(&row.email).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid email in database: {e}"))
        })?;

        let coordinates = match (row.lat, row.lng) {
            (Some(lat), Some(lng)) => Some(Coordinates::new(lat, lng).map_err(|e| {
                RepositoryError::DataCorruption(format!("invalid user coordinates: {e}"))
            })?),
            _ => None,
        };

        Ok(Self {
            id: UserId::new(row.id),
            email,
            address: row.address,
            coordinates,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

const USER_COLUMNS: &str = r"
    id, email, address,
    coordinates[0] AS lat, coordinates[1] AS lng,
    created_at, updated_at
";

/// Repository for user database operations.
pub struct UserRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> UserRepository<'a> {
    /// Create a new user repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get a user by their ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the stored row is invalid.
    pub async fn get_by_id(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        row.map(User::try_from).transpose()
    }

    /// Create a new user.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the email already exists.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create(&self, user: &NewUser) -> Result<User, RepositoryError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            r"
            INSERT INTO users (email, hashed_password, address, coordinates)
            VALUES ($1, $2, $3, point($4, $5))
            RETURNING {USER_COLUMNS}
            "
        ))
        .bind(&user.email)
        .bind(&user.hashed_password)
        .bind(&user.address)
        .bind(user.coordinates.map(|c| c.lat))
        .bind(user.coordinates.map(|c| c.lng))
        .fetch_one(self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.is_unique_violation()
            {
                return RepositoryError::Conflict("email already exists".to_owned());
            }
            RepositoryError::Database(e)
        })?;

        User::try_from(row)
    }

    /// Remove every user and, by cascade, every farm.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the statement fails.
    pub async fn truncate_all(&self) -> Result<(), RepositoryError> {
        sqlx::query("TRUNCATE TABLE users CASCADE")
            .execute(self.pool)
            .await?;
        Ok(())
    }
}
