//! Chinese lunisolar calendar conversions.
//!
//! Dates are converted by counting days from lunar 1900-01-01 (solar
//! 1900-01-31) through the packed per-year month tables in [`table`].
//! Conversions cover lunar years 1900 through 2100.
//!
//! A good source of date conversions to verify against is
//! <https://www.hko.gov.hk/en/gts/time/conversion.htm>.

mod table;

use std::fmt;

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

use table::LUNAR_YEAR_INFO;

/// First lunar year covered by the tables.
pub const MIN_YEAR: i32 = 1900;
/// Last lunar year covered by the tables.
pub const MAX_YEAR: i32 = 2100;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LunarError {
    #[error("lunar year {0} is outside the supported range 1900-2100")]
    YearOutOfRange(i32),

    #[error("solar date {0} is outside the supported lunar calendar range")]
    DateOutOfRange(NaiveDate),

    #[error("invalid lunar date: month {month}, day {day}")]
    InvalidDate { month: u32, day: u32 },
}

pub type LunarResult<T> = Result<T, LunarError>;

/// A date in the lunar calendar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LunarDate {
    pub year: i32,
    pub month: u32,
    pub day: u32,
    /// If true, this month is the repeated (leap) instance of `month`.
    pub is_leap: bool,
}

impl LunarDate {
    pub fn new(year: i32, month: u32, day: u32, is_leap: bool) -> Self {
        LunarDate {
            year,
            month,
            day,
            is_leap,
        }
    }

    /// Same month, day and leap flag in another lunar year.
    pub fn with_year(self, year: i32) -> Self {
        LunarDate { year, ..self }
    }

    pub fn as_leap(self, is_leap: bool) -> Self {
        LunarDate { is_leap, ..self }
    }

    pub fn to_solar(self) -> LunarResult<NaiveDate> {
        lunar_to_solar(self)
    }

    /// Clears the leap flag unless `month` really is the leap month of
    /// `year`, so the flag cannot select a leap month in another year.
    pub fn resolve_leap(self) -> LunarResult<Self> {
        let is_leap = self.is_leap && leap_month(self.year)? == Some(self.month);
        Ok(self.as_leap(is_leap))
    }

    fn validate(&self) -> LunarResult<()> {
        if !(1..=12).contains(&self.month) || !(1..=30).contains(&self.day) {
            return Err(LunarError::InvalidDate {
                month: self.month,
                day: self.day,
            });
        }
        Ok(())
    }
}

impl fmt::Display for LunarDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}-{:02}", self.year, self.month, self.day)?;
        if self.is_leap {
            f.write_str(" (leap)")?;
        }
        Ok(())
    }
}

/// Decoded view over one packed table entry.
#[derive(Debug, Clone, Copy)]
struct YearInfo(u32);

impl YearInfo {
    fn leap_month(self) -> Option<u32> {
        match self.0 & 0xf {
            0 => None,
            m => Some(m),
        }
    }

    fn month_days(self, month: u32) -> u32 {
        if self.0 & (0x10000 >> month) != 0 {
            30
        } else {
            29
        }
    }

    fn leap_days(self) -> u32 {
        match self.leap_month() {
            None => 0,
            Some(_) if self.0 & 0x10000 != 0 => 30,
            Some(_) => 29,
        }
    }

    fn total_days(self) -> u32 {
        (1..=12).map(|m| self.month_days(m)).sum::<u32>() + self.leap_days()
    }
}

fn year_info(year: i32) -> LunarResult<YearInfo> {
    if !(MIN_YEAR..=MAX_YEAR).contains(&year) {
        return Err(LunarError::YearOutOfRange(year));
    }
    Ok(YearInfo(LUNAR_YEAR_INFO[(year - MIN_YEAR) as usize]))
}

/// Solar date of lunar 1900-01-01.
fn epoch() -> NaiveDate {
    NaiveDate::from_ymd_opt(1900, 1, 31).expect("lunar epoch is a valid date")
}

/// The month repeated as a leap month in `year`, if any.
pub fn leap_month(year: i32) -> LunarResult<Option<u32>> {
    Ok(year_info(year)?.leap_month())
}

/// Days in the regular (non-leap) instance of `month`.
pub fn month_days(year: i32, month: u32) -> LunarResult<u32> {
    if !(1..=12).contains(&month) {
        return Err(LunarError::InvalidDate { month, day: 1 });
    }
    Ok(year_info(year)?.month_days(month))
}

/// Days in the leap month of `year`, 0 when the year has none.
pub fn leap_month_days(year: i32) -> LunarResult<u32> {
    Ok(year_info(year)?.leap_days())
}

pub fn year_days(year: i32) -> LunarResult<u32> {
    Ok(year_info(year)?.total_days())
}

/// Converts a lunar date to the solar (Gregorian) calendar.
///
/// A leap flag on a month that is not repeated in that year is ignored. A day
/// past the end of a 29-day month rolls over into the following month.
pub fn lunar_to_solar(date: LunarDate) -> LunarResult<NaiveDate> {
    date.validate()?;
    let info = year_info(date.year)?;

    let mut offset: u64 = LUNAR_YEAR_INFO[..(date.year - MIN_YEAR) as usize]
        .iter()
        .map(|&bits| u64::from(YearInfo(bits).total_days()))
        .sum();

    let leap = info.leap_month();
    for month in 1..date.month {
        offset += u64::from(info.month_days(month));
        if leap == Some(month) {
            offset += u64::from(info.leap_days());
        }
    }
    if date.is_leap && leap == Some(date.month) {
        offset += u64::from(info.month_days(date.month));
    }
    offset += u64::from(date.day - 1);

    let start = epoch();
    start
        .checked_add_days(Days::new(offset))
        .ok_or(LunarError::DateOutOfRange(start))
}

/// Converts a solar (Gregorian) date to the lunar calendar.
pub fn solar_to_lunar(date: NaiveDate) -> LunarResult<LunarDate> {
    let mut offset = (date - epoch()).num_days();
    if offset < 0 {
        return Err(LunarError::DateOutOfRange(date));
    }

    let mut year = MIN_YEAR;
    let info = loop {
        let info = year_info(year).map_err(|_| LunarError::DateOutOfRange(date))?;
        let days = i64::from(info.total_days());
        if offset < days {
            break info;
        }
        offset -= days;
        year += 1;
    };

    let leap = info.leap_month();
    for month in 1..=12 {
        let days = i64::from(info.month_days(month));
        if offset < days {
            return Ok(LunarDate::new(year, month, offset as u32 + 1, false));
        }
        offset -= days;

        if leap == Some(month) {
            let days = i64::from(info.leap_days());
            if offset < days {
                return Ok(LunarDate::new(year, month, offset as u32 + 1, true));
            }
            offset -= days;
        }
    }

    // total_days() covers every month above, so the offset is always consumed.
    Err(LunarError::DateOutOfRange(date))
}

/// Reports whether `month` of lunar `year` is repeated, i.e. whether a date
/// given without leap information could refer to the leap month.
pub fn is_leap_month_possible(year: i32, month: u32) -> LunarResult<bool> {
    if !(1..=12).contains(&month) {
        return Err(LunarError::InvalidDate { month, day: 1 });
    }
    Ok(leap_month(year)? == Some(month))
}
