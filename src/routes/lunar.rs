use std::sync::Arc;

use axum::{extract::rejection::JsonRejection, routing::post, Json, Router};

use crate::error::{AppError, AppResult};
use crate::lunar;
use crate::models::{
    LeapMonthPossibleRequest, LeapMonthPossibleResponse, LunarBirthdayForYearRequest,
    LunarBirthdayForYearResponse, SolarToLunarRequest, SolarToLunarResponse,
};
use crate::services::birthday::lunar_birthday_for_year;
use crate::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/lunar-birthday-for-year/", post(birthday_for_year))
        .route("/solar-to-lunar/", post(solar_to_lunar))
        .route("/leap-month-possible/", post(leap_month_possible))
}

/// Solar date of a lunar birthday in the requested year.
async fn birthday_for_year(
    payload: Result<Json<LunarBirthdayForYearRequest>, JsonRejection>,
) -> AppResult<Json<LunarBirthdayForYearResponse>> {
    let Json(req) = payload?;
    let birth = req.lunar_birth_date.to_lunar(req.is_leap_month);

    let birthday = lunar_birthday_for_year(birth, req.year)?;
    tracing::debug!("Lunar birthday {} in {} is {}", birth, req.year, birthday);

    Ok(Json(birthday.into()))
}

async fn solar_to_lunar(
    payload: Result<Json<SolarToLunarRequest>, JsonRejection>,
) -> AppResult<Json<SolarToLunarResponse>> {
    let Json(req) = payload?;
    let solar = req.solar_birth_date.to_solar().ok_or_else(|| {
        AppError::BadRequest(format!(
            "{} is not a valid solar date",
            req.solar_birth_date
        ))
    })?;

    let lunar = lunar::solar_to_lunar(solar)?;
    Ok(Json(lunar.into()))
}

/// Whether the given lunar month repeats in that year, so a date given
/// without leap information may refer to the leap month.
async fn leap_month_possible(
    payload: Result<Json<LeapMonthPossibleRequest>, JsonRejection>,
) -> AppResult<Json<LeapMonthPossibleResponse>> {
    let Json(req) = payload?;

    Ok(Json(LeapMonthPossibleResponse {
        possible: lunar::is_leap_month_possible(req.year, req.month)?,
        leap_month: lunar::leap_month(req.year)?,
    }))
}
