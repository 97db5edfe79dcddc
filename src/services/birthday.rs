use chrono::NaiveDate;

use crate::error::{AppError, AppResult};
use crate::lunar::LunarDate;

/// Computes the solar date of a lunar birthday in lunar year `year`.
///
/// The birthday keeps the lunar month, day and leap flag of `birth`. In years
/// where the birth month is not repeated, a leap-month birthday falls on the
/// regular month. A leap flag on a month that was not repeated in the birth
/// year is dropped.
pub fn lunar_birthday_for_year(birth: LunarDate, year: i32) -> AppResult<NaiveDate> {
    if birth.year > year {
        return Err(AppError::BadRequest(format!(
            "birth year {} can't be greater than input year {}",
            birth.year, year
        )));
    }

    birthday_in(birth.resolve_leap()?, year)
}

/// Solar dates of every lunar birthday from the birth year through
/// `last_year`, in order. Empty when `last_year` precedes the birth year.
pub fn lunar_birthdays_through(birth: LunarDate, last_year: i32) -> AppResult<Vec<NaiveDate>> {
    if last_year < birth.year {
        return Ok(Vec::new());
    }

    let birth = birth.resolve_leap()?;
    (birth.year..=last_year)
        .map(|year| birthday_in(birth, year))
        .collect()
}

fn birthday_in(birth: LunarDate, year: i32) -> AppResult<NaiveDate> {
    Ok(birth.with_year(year).to_solar()?)
}
