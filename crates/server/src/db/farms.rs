//! Farm repository for database operations.
//!
//! Coordinates are stored as a `point` and read back through the `[0]`/`[1]`
//! subscripts, so no geometric type mapping is needed on the Rust side.

use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use farm_report_core::{Cohort, Coordinates, FarmId, UserId};

use super::RepositoryError;
use crate::models::{Farm, NewFarm};

/// Internal row type for farm queries.
#[derive(Debug, sqlx::FromRow)]
struct FarmRow {
    id: Uuid,
    name: String,
    address: String,
    lat: f64,
    lng: f64,
    size: Decimal,
    farm_yield: Decimal,
    user_id: Uuid,
}

impl TryFrom<FarmRow> for Farm {
    type Error = RepositoryError;

    fn try_from(row: FarmRow) -> Result<Self, Self::Error> {
        let coordinates = Coordinates::new(row.lat, row.lng).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid farm coordinates: {e}"))
        })?;

        Ok(Self {
            id: FarmId::new(row.id),
            name: row.name,
            address: row.address,
            coordinates,
            size: row.size,
            farm_yield: row.farm_yield,
            owner_id: UserId::new(row.user_id),
        })
    }
}

const FARM_COLUMNS: &str = r#"
    f.id, f.name, f.address,
    f.coordinates[0] AS lat, f.coordinates[1] AS lng,
    f.size, f."yield" AS farm_yield, f.user_id
"#;

/// Repository for farm database operations.
pub struct FarmRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> FarmRepository<'a> {
    /// Create a new farm repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Insert a farm.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the owner does not exist.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create(&self, farm: &NewFarm) -> Result<Farm, RepositoryError> {
        let row = sqlx::query_as::<_, FarmRow>(&format!(
            r#"
            INSERT INTO farms AS f (name, address, coordinates, size, "yield", user_id)
            VALUES ($1, $2, point($3, $4), $5, $6, $7)
            RETURNING {FARM_COLUMNS}
            "#
        ))
        .bind(&farm.name)
        .bind(&farm.address)
        .bind(farm.coordinates.lat)
        .bind(farm.coordinates.lng)
        .bind(farm.size)
        .bind(farm.farm_yield)
        .bind(farm.owner_id)
        .fetch_one(self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.is_foreign_key_violation()
            {
                return RepositoryError::Conflict(format!("unknown owner {}", farm.owner_id));
            }
            RepositoryError::Database(e)
        })?;

        Farm::try_from(row)
    }

    /// Get a farm by its ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_id(&self, id: FarmId) -> Result<Option<Farm>, RepositoryError> {
        let row = sqlx::query_as::<_, FarmRow>(&format!(
            "SELECT {FARM_COLUMNS} FROM farms f WHERE f.id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        row.map(Farm::try_from).transpose()
    }

    /// Delete a farm, returning the removed row if it existed.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the statement fails.
    pub async fn delete(&self, id: FarmId) -> Result<Option<Farm>, RepositoryError> {
        let row = sqlx::query_as::<_, FarmRow>(&format!(
            "DELETE FROM farms AS f WHERE f.id = $1 RETURNING {FARM_COLUMNS}"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        row.map(Farm::try_from).transpose()
    }

    /// Farms on one side of `0.3 * AVG(yield)` over the whole table.
    ///
    /// The average is computed in the same statement, so it reflects the
    /// table as of this query. Names sort byte-wise, independent of the
    /// database collation.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_cohort(&self, cohort: Cohort) -> Result<Vec<Farm>, RepositoryError> {
        let rows = sqlx::query_as::<_, FarmRow>(&format!(
            r#"
            SELECT {FARM_COLUMNS}
            FROM farms f
            WHERE f."yield" {op} (SELECT AVG("yield") * 0.3 FROM farms)
            ORDER BY f.name COLLATE "C" ASC
            "#,
            op = cohort.sql_operator(),
        ))
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(Farm::try_from).collect()
    }

    /// Number of farms in the table.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn count(&self) -> Result<i64, RepositoryError> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM farms")
            .fetch_one(self.pool)
            .await?;
        Ok(count)
    }
}
