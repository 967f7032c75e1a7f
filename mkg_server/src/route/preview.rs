use axum::{http::StatusCode, Json};
use mkg_core::{preview::PreviewRow, request::CalendarRequest};

use crate::route::bad_request;

/// Handle preview requests.
///
/// Takes the same JSON body as the calendar download and lists where each pickup ends up.
pub async fn handler(
    Json(calendar_request): Json<CalendarRequest>,
) -> Result<Json<Vec<PreviewRow>>, (StatusCode, String)> {
    let rows = calendar_request
        .validate()
        .and_then(|validated| validated.preview())
        .map_err(bad_request)?;
    Ok(Json(rows))
}
