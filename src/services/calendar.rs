use chrono::{DateTime, Utc};
use tracing::debug;

use crate::config::CalendarConfig;
use crate::error::{AppError, AppResult};
use crate::ical::{Alarm, Calendar, Event};
use crate::lunar::LunarDate;
use crate::services::birthday::lunar_birthdays_through;
use crate::services::notification::Notification;

const ALARM_DESCRIPTION: &str = "This is an event reminder";

/// A yearly all-day event on a lunar birthday, from the birth year through
/// `last_year`.
#[derive(Debug, Clone)]
pub struct BirthdayCalendar {
    pub birth: LunarDate,
    pub last_year: i32,
    pub title: String,
    pub description: String,
    pub notifications: Vec<Notification>,
}

impl BirthdayCalendar {
    /// Builds the calendar, stamping every event with `stamp`.
    ///
    /// Fails when the span exceeds `config.max_years` events or reaches past
    /// the supported lunar years.
    pub fn generate(&self, config: &CalendarConfig, stamp: DateTime<Utc>) -> AppResult<Calendar> {
        let span = i64::from(self.last_year) - i64::from(self.birth.year) + 1;
        if span > i64::from(config.max_years) {
            return Err(AppError::Validation(format!(
                "calendar would span {} years; at most {} are allowed",
                span, config.max_years
            )));
        }

        let alarms: Vec<Alarm> = self
            .notifications
            .iter()
            .map(|n| Alarm {
                trigger: n.trigger(),
                description: ALARM_DESCRIPTION.to_string(),
            })
            .collect();

        let mut calendar = Calendar::new(config.prodid.clone());
        for birthday in lunar_birthdays_through(self.birth, self.last_year)? {
            calendar.push_event(Event {
                uid: format!("{}-{}", self.title, birthday),
                stamp,
                start: birthday,
                summary: self.title.clone(),
                description: self.description.clone(),
                alarms: alarms.clone(),
            });
        }

        debug!(
            "Generated calendar for {} with {} events and {} alarms each",
            self.birth,
            calendar.events().len(),
            alarms.len()
        );

        Ok(calendar)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate, TimeZone};

    fn config() -> CalendarConfig {
        CalendarConfig {
            max_years: 200,
            prodid: "-//test//EN".to_string(),
        }
    }

    fn stamp() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2020, 11, 6, 0, 0, 0).unwrap()
    }

    fn request(last_year: i32) -> BirthdayCalendar {
        BirthdayCalendar {
            birth: LunarDate::new(2020, 11, 6, false),
            last_year,
            title: "test-title".to_string(),
            description: "test-description".to_string(),
            notifications: vec![
                Notification::after(Duration::hours(9)),
                Notification::before(Duration::hours(15)),
                Notification::before(Duration::days(6) + Duration::hours(15)),
                Notification::before(Duration::days(13) + Duration::hours(15)),
            ],
        }
    }

    #[test]
    fn multiple_years_and_notifications() {
        let calendar = request(2022).generate(&config(), stamp()).unwrap();
        let events = calendar.events();
        assert_eq!(events.len(), 3);

        let first = &events[0];
        assert_eq!(first.uid, "test-title-2020-12-20");
        assert_eq!(first.start, NaiveDate::from_ymd_opt(2020, 12, 20).unwrap());
        assert_eq!(first.summary, "test-title");
        assert_eq!(first.description, "test-description");

        let triggers: Vec<&str> = first.alarms.iter().map(|a| a.trigger.as_str()).collect();
        assert_eq!(
            triggers,
            vec!["P0DT9H0M0S", "-P0DT15H0M0S", "-P6DT15H0M0S", "-P13DT15H0M0S"]
        );
        assert!(events.iter().all(|e| e.alarms.len() == 4));

        let ics = calendar.serialize();
        assert_eq!(ics.matches("BEGIN:VEVENT").count(), 3);
        assert_eq!(ics.matches("BEGIN:VALARM").count(), 12);
        assert!(ics.contains("DTSTART;VALUE=DATE:20201220\r\n"));
    }

    #[test]
    fn last_year_before_birth_gives_empty_calendar() {
        let calendar = request(2019).generate(&config(), stamp()).unwrap();
        assert!(calendar.events().is_empty());
    }

    #[test]
    fn spurious_leap_flag_stays_on_regular_month() {
        let calendar = BirthdayCalendar {
            birth: LunarDate::new(2019, 4, 1, true),
            ..request(2020)
        }
        .generate(&config(), stamp())
        .unwrap();

        let starts: Vec<NaiveDate> = calendar.events().iter().map(|e| e.start).collect();
        assert_eq!(
            starts,
            vec![
                NaiveDate::from_ymd_opt(2019, 5, 5).unwrap(),
                NaiveDate::from_ymd_opt(2020, 4, 23).unwrap(),
            ]
        );
    }

    #[test]
    fn span_limit_is_enforced() {
        let mut cfg = config();
        cfg.max_years = 2;
        assert!(matches!(
            request(2022).generate(&cfg, stamp()),
            Err(AppError::Validation(_))
        ));
        assert!(request(2021).generate(&cfg, stamp()).is_ok());
    }

    #[test]
    fn span_past_supported_years_fails() {
        assert!(matches!(
            request(2101).generate(&config(), stamp()),
            Err(AppError::Lunar(_))
        ));
    }
}
