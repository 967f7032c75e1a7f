use axum::{extract::Query, http::StatusCode, Json};
use chrono::{Datelike, Local};
use mkg_core::{holiday::HolidayRecord, holiday_client};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct QueryParams {
    country: String,
    region: Option<String>,
    year: Option<i32>,
}

/// Handle holiday requests.
///
/// The `country` must be given in the query string, `region` and `year` are optional.
pub async fn handler(
    Query(query_params): Query<QueryParams>,
) -> Result<Json<Vec<HolidayRecord>>, (StatusCode, String)> {
    if query_params.country.trim().is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            String::from("Land muss angegeben werden"),
        ));
    }
    let year = query_params.year.unwrap_or_else(|| Local::now().year());
    let holidays = holiday_client::get(
        &query_params.country,
        query_params.region.as_deref(),
        year,
    )
    .await
    .map_err(|err| (StatusCode::INTERNAL_SERVER_ERROR, err.to_string()))?;
    Ok(Json(holidays))
}
