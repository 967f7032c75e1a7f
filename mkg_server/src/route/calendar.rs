use axum::{
    http::{
        header::{CONTENT_DISPOSITION, CONTENT_TYPE},
        StatusCode,
    },
    response::{IntoResponse, Response},
    Json,
};
use log::info;
use mkg_core::{ical::generator::Emitter, request::CalendarRequest};

use crate::route::bad_request;

/// Handle calendar requests.
///
/// The calendar request is given as JSON body, the calendar is returned as download.
pub async fn handler(
    Json(calendar_request): Json<CalendarRequest>,
) -> Result<Response, (StatusCode, String)> {
    let ical_calendar = calendar_request
        .validate()
        .and_then(|validated| validated.calendar())
        .map_err(bad_request)?;
    info!(
        "generated {} {} events",
        ical_calendar.events.len(),
        calendar_request.event_name
    );
    let response = (
        [
            (CONTENT_TYPE, "text/calendar"),
            (
                CONTENT_DISPOSITION,
                "attachment; filename=\"muellkalender.ics\"",
            ),
        ],
        ical_calendar.generate(),
    )
        .into_response();
    Ok(response)
}
