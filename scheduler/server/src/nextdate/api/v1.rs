use crate::nextdate::{next_date, parse_date};
use crate::web::api::v1::{ApiError, ErrorResponse};
use axum::{Router, extract::Query, routing::get};
use serde::Deserialize;
use utoipa::IntoParams;

/// Query parameters of the next date calculator.
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct NextDateQuery {
    /// Reference date as YYYYMMDD
    #[serde(default)]
    now: String,
    /// Last scheduled date as YYYYMMDD
    #[serde(default)]
    date: String,
    /// Repeat rule
    #[serde(default)]
    repeat: String,
}

/// Handler for GET /api/nextdate - Computes the next date of a repeat rule.
///
/// Responds with the bare `YYYYMMDD` string.
#[tracing::instrument]
#[utoipa::path(
    get,
    path = "/api/nextdate",
    params(NextDateQuery),
    responses(
        (status = 200, description = "Next date as YYYYMMDD", body = String, content_type = "text/plain"),
        (status = 400, description = "Malformed date or invalid repeat rule", body = ErrorResponse)
    ),
    tag = "Scheduler"
)]
pub async fn next_date_handler(Query(query): Query<NextDateQuery>) -> Result<String, ApiError> {
    let now = parse_date(&query.now).map_err(|_| {
        ApiError::BadRequest(format!("Malformed now {:?}, expected YYYYMMDD", query.now))
    })?;
    Ok(next_date(now, &query.date, &query.repeat)?)
}

/// Creates and returns the next date API router.
pub fn create_api_router() -> Router {
    Router::new().route("/nextdate", get(next_date_handler))
}
