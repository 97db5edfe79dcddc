//! Request and response bodies of the `/api/v1` endpoints, shared by the
//! server handlers and the API client.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::lunar::LunarDate;
use crate::services::notification::Notification;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid date {0:?}: expected YYYY-MM-DD or an RFC 3339 timestamp")]
pub struct DatePartsError(String);

/// Year, month and day as written in a request, before any calendar is
/// applied.
///
/// Lunar dates are carried in the same `YYYY-MM-DD` shape as solar ones, so
/// no Gregorian validation happens here (lunar day 30 of month 2 is legal).
/// Timestamps such as `1958-11-06T00:00:00.000Z` contribute only their date
/// part, i.e. the date in the timestamp's own offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DateParts {
    pub year: i32,
    pub month: u32,
    pub day: u32,
}

impl DateParts {
    pub fn new(year: i32, month: u32, day: u32) -> Self {
        DateParts { year, month, day }
    }

    pub fn to_lunar(self, is_leap: bool) -> LunarDate {
        LunarDate::new(self.year, self.month, self.day, is_leap)
    }

    pub fn to_solar(self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month, self.day)
    }
}

impl From<NaiveDate> for DateParts {
    fn from(date: NaiveDate) -> Self {
        DateParts::new(date.year(), date.month(), date.day())
    }
}

impl From<LunarDate> for DateParts {
    fn from(date: LunarDate) -> Self {
        DateParts::new(date.year, date.month, date.day)
    }
}

impl FromStr for DateParts {
    type Err = DatePartsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || DatePartsError(s.to_string());

        let date = s.trim().split(['T', 't', ' ']).next().unwrap_or_default();
        let mut parts = date.splitn(3, '-');
        let (Some(year), Some(month), Some(day)) = (parts.next(), parts.next(), parts.next())
        else {
            return Err(err());
        };
        if year.len() < 4 || month.len() != 2 || day.len() != 2 {
            return Err(err());
        }

        let year: i32 = year.parse().map_err(|_| err())?;
        let month: u32 = month.parse().map_err(|_| err())?;
        let day: u32 = day.parse().map_err(|_| err())?;
        if !(1..=12).contains(&month) || !(1..=31).contains(&day) {
            return Err(err());
        }

        Ok(DateParts { year, month, day })
    }
}

impl TryFrom<String> for DateParts {
    type Error = DatePartsError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<DateParts> for String {
    fn from(date: DateParts) -> Self {
        date.to_string()
    }
}

impl fmt::Display for DateParts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}-{:02}", self.year, self.month, self.day)
    }
}

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LunarBirthdayForYearRequest {
    pub lunar_birth_date: DateParts,
    #[serde(default)]
    pub is_leap_month: bool,
    pub year: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LunarBirthdayForYearResponse {
    pub year: i32,
    pub month: u32,
    pub day: u32,
}

impl From<NaiveDate> for LunarBirthdayForYearResponse {
    fn from(date: NaiveDate) -> Self {
        LunarBirthdayForYearResponse {
            year: date.year(),
            month: date.month(),
            day: date.day(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SolarToLunarRequest {
    pub solar_birth_date: DateParts,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SolarToLunarResponse {
    pub year: i32,
    pub month: u32,
    pub day: u32,
    pub is_leap: bool,
}

impl From<LunarDate> for SolarToLunarResponse {
    fn from(date: LunarDate) -> Self {
        SolarToLunarResponse {
            year: date.year,
            month: date.month,
            day: date.day,
            is_leap: date.is_leap,
        }
    }
}

impl From<SolarToLunarResponse> for LunarDate {
    fn from(resp: SolarToLunarResponse) -> Self {
        LunarDate::new(resp.year, resp.month, resp.day, resp.is_leap)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LunarBirthdayCalendarRequest {
    pub lunar_birth_date: DateParts,
    #[serde(default)]
    pub is_leap_month: bool,
    pub last_year: i32,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub notifications: Vec<Notification>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LunarBirthdayCalendarResponse {
    /// Serialized .ics text.
    pub calendar: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeapMonthPossibleRequest {
    pub year: i32,
    pub month: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeapMonthPossibleResponse {
    pub possible: bool,
    pub leap_month: Option<u32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plain_dates_and_timestamps() {
        assert_eq!(
            "1958-11-06".parse::<DateParts>().unwrap(),
            DateParts::new(1958, 11, 6)
        );
        assert_eq!(
            "1958-11-06T00:00:00.000Z".parse::<DateParts>().unwrap(),
            DateParts::new(1958, 11, 6)
        );
        assert_eq!(
            "2020-05-23T23:30:00-08:00".parse::<DateParts>().unwrap(),
            DateParts::new(2020, 5, 23)
        );
    }

    #[test]
    fn lunar_only_dates_are_accepted() {
        let parts = "2020-02-30".parse::<DateParts>().unwrap();
        assert_eq!(parts.to_lunar(false), LunarDate::new(2020, 2, 30, false));
        assert_eq!(parts.to_solar(), None);
    }

    #[test]
    fn rejects_malformed_dates() {
        for bad in ["", "2020", "2020-1-5", "20-01-05", "2020-13-01", "2020-01-00", "abcd-01-01"] {
            assert!(bad.parse::<DateParts>().is_err(), "{:?} should fail", bad);
        }
    }

    #[test]
    fn request_bodies_deserialize() {
        let req: LunarBirthdayForYearRequest = serde_json::from_str(
            r#"{"lunar_birth_date":"1958-11-06T00:00:00.000Z","is_leap_month":false,"year":2020}"#,
        )
        .unwrap();
        assert_eq!(req.lunar_birth_date, DateParts::new(1958, 11, 6));
        assert_eq!(req.year, 2020);

        let req: LunarBirthdayCalendarRequest = serde_json::from_str(
            r#"{"lunar_birth_date":"2020-11-06","last_year":2022,"title":"t",
                "notifications":[{"duration":"15h"},{"duration":32400000000000,"forward":true}]}"#,
        )
        .unwrap();
        assert!(!req.is_leap_month);
        assert_eq!(req.description, "");
        assert_eq!(req.notifications.len(), 2);
        assert!(req.notifications[1].forward);
    }

    #[test]
    fn date_parts_serialize_as_plain_dates() {
        let json = serde_json::to_string(&SolarToLunarRequest {
            solar_birth_date: DateParts::new(2020, 5, 3),
        })
        .unwrap();
        assert_eq!(json, r#"{"solar_birth_date":"2020-05-03"}"#);
    }
}
