use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    routing::post,
    Json, Router,
};

use crate::error::AppResult;
use crate::models::{LunarBirthdayCalendarRequest, LunarBirthdayCalendarResponse};
use crate::services::calendar::BirthdayCalendar;
use crate::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/lunar-birthday-calendar/", post(generate_calendar))
}

/// Generate an .ics calendar with one event per lunar birthday through
/// `last_year`, each carrying the requested alarms.
async fn generate_calendar(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<LunarBirthdayCalendarRequest>, JsonRejection>,
) -> AppResult<Json<LunarBirthdayCalendarResponse>> {
    let Json(req) = payload?;

    let request = BirthdayCalendar {
        birth: req.lunar_birth_date.to_lunar(req.is_leap_month),
        last_year: req.last_year,
        title: req.title,
        description: req.description,
        notifications: req.notifications,
    };

    let calendar = request.generate(&state.config.calendar, chrono::Utc::now())?;
    tracing::info!(
        "Generated birthday calendar \"{}\" with {} events",
        request.title,
        calendar.events().len()
    );

    Ok(Json(LunarBirthdayCalendarResponse {
        calendar: calendar.serialize(),
    }))
}
