//! Farm route handlers.
//!
//! Bodies are deserialized into explicit request structs and validated here;
//! the engine only ever receives typed commands. All successes are `201`.

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
};
use rust_decimal::Decimal;
use serde::Deserialize;

use farm_report_core::{Cohort, FarmId, MAX_MEASURE};

use crate::error::{AppError, Result};
use crate::middleware::AuthorizationHeader;
use crate::models::{Farm, RemovedFarm, ReportRow};
use crate::services::{CreateFarm, DeleteFarm, FarmReportQuery};
use crate::state::AppState;

/// `POST /create` body.
#[derive(Debug, Deserialize)]
pub struct CreateFarmRequest {
    pub name: String,
    pub address: String,
    pub size: Decimal,
    #[serde(rename = "yield")]
    pub farm_yield: Decimal,
    #[serde(default)]
    pub authorization: Option<String>,
}

/// `POST /delete` body.
#[derive(Debug, Deserialize)]
pub struct DeleteFarmRequest {
    pub id: String,
    #[serde(default)]
    pub authorization: Option<String>,
}

/// `POST /all` body.
#[derive(Debug, Deserialize)]
pub struct ReportRequest {
    pub outliers: bool,
    #[serde(default)]
    pub authorization: Option<String>,
}

fn required_text(field: &str, value: String) -> Result<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(AppError::Validation(format!("{field} must not be empty")));
    }
    Ok(trimmed.to_owned())
}

impl CreateFarmRequest {
    fn into_command(self, auth: AuthorizationHeader) -> Result<CreateFarm> {
        let name = required_text("name", self.name)?;
        let address = required_text("address", self.address)?;
        if self.size <= Decimal::ZERO {
            return Err(AppError::Validation("size must be positive".to_owned()));
        }
        if self.farm_yield < Decimal::ZERO {
            return Err(AppError::Validation("yield must not be negative".to_owned()));
        }
        for (field, value) in [("size", self.size), ("yield", self.farm_yield)] {
            if value > MAX_MEASURE {
                return Err(AppError::Validation(format!(
                    "{field} must be at most {MAX_MEASURE}"
                )));
            }
        }

        Ok(CreateFarm {
            credential: auth.or_body(self.authorization),
            name,
            address,
            size: self.size,
            farm_yield: self.farm_yield,
        })
    }
}

impl DeleteFarmRequest {
    fn into_command(self, auth: AuthorizationHeader) -> Result<DeleteFarm> {
        let id: FarmId = self
            .id
            .trim()
            .parse()
            .map_err(|_| AppError::Validation(format!("id must be a UUID, got {:?}", self.id)))?;

        Ok(DeleteFarm {
            credential: auth.or_body(self.authorization),
            id,
        })
    }
}

impl ReportRequest {
    fn into_command(self, auth: AuthorizationHeader) -> FarmReportQuery {
        FarmReportQuery {
            credential: auth.or_body(self.authorization),
            cohort: Cohort::from_outliers_flag(self.outliers),
        }
    }
}

fn body<T>(payload: std::result::Result<Json<T>, JsonRejection>) -> Result<T> {
    payload
        .map(|Json(body)| body)
        .map_err(|rejection| AppError::Validation(rejection.body_text()))
}

/// Create a farm owned by the caller.
pub async fn create(
    State(state): State<AppState>,
    auth: AuthorizationHeader,
    payload: std::result::Result<Json<CreateFarmRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Farm>)> {
    let cmd = body(payload)?.into_command(auth)?;
    let farm = state.engine().create_farm(cmd).await?;
    Ok((StatusCode::CREATED, Json(farm)))
}

/// Delete one of the caller's farms, returning it without its id.
pub async fn delete(
    State(state): State<AppState>,
    auth: AuthorizationHeader,
    payload: std::result::Result<Json<DeleteFarmRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<RemovedFarm>)> {
    let cmd = body(payload)?.into_command(auth)?;
    let removed = state.engine().delete_farm(cmd).await?;
    Ok((StatusCode::CREATED, Json(removed)))
}

/// Yield report for the requested cohort.
pub async fn all(
    State(state): State<AppState>,
    auth: AuthorizationHeader,
    payload: std::result::Result<Json<ReportRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Vec<ReportRow>>)> {
    let query = body(payload)?.into_command(auth);
    let rows = state.engine().report(query).await?;
    Ok((StatusCode::CREATED, Json(rows)))
}
