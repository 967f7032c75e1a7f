pub mod calendar;
pub mod holidays;
pub mod preview;

use axum::http::StatusCode;
use log::warn;
use mkg_core::error::ScheduleError;

/// Invalid requests are the client's fault.
pub fn bad_request(err: ScheduleError) -> (StatusCode, String) {
    warn!("rejecting request: {err}");
    (StatusCode::BAD_REQUEST, err.to_string())
}
