//! Calendar alarm offsets.
//!
//! A notification is a duration relative to the start of an all-day event,
//! counted backwards unless `forward` is set. On the wire the duration is
//! either a number of nanoseconds or a Go-style duration string such as
//! `"15h"` or `"1h30m"`.

use std::str::FromStr;

use chrono::Duration;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DurationError {
    #[error("invalid duration {0:?}")]
    Invalid(String),

    #[error("unknown unit {unit:?} in duration {input:?}")]
    UnknownUnit { unit: String, input: String },

    #[error("duration {0:?} is negative; set \"forward\" to place the alarm after the event")]
    Negative(String),

    #[error("duration {0:?} is too large")]
    Overflow(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    #[serde(
        serialize_with = "serialize_nanos",
        deserialize_with = "deserialize_duration"
    )]
    pub duration: Duration,
    /// If true, the alarm fires after the event start, otherwise before it.
    #[serde(default)]
    pub forward: bool,
}

impl Notification {
    pub fn before(duration: Duration) -> Self {
        Notification {
            duration,
            forward: false,
        }
    }

    pub fn after(duration: Duration) -> Self {
        Notification {
            duration,
            forward: true,
        }
    }

    /// RFC 5545 TRIGGER value, e.g. `-P0DT15H0M0S`.
    ///
    /// Only whole seconds are kept; the day/hour/minute/second split is
    /// always written out in full.
    pub fn trigger(&self) -> String {
        let total = self.duration.num_seconds();
        let days = total / 86_400;
        let hours = (total / 3_600) % 24;
        let minutes = (total / 60) % 60;
        let seconds = total % 60;

        let direction = if self.forward { "" } else { "-" };
        format!("{direction}P{days}DT{hours}H{minutes}M{seconds}S")
    }
}

/// CLI form: `15h` is a reminder before the event, `+9h` one after it.
impl FromStr for Notification {
    type Err = DurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.strip_prefix('+') {
            Some(rest) => Ok(Notification::after(parse_duration(rest)?)),
            None => Ok(Notification::before(parse_duration(s)?)),
        }
    }
}

fn unit_nanos(unit: &str) -> Option<u128> {
    let nanos = match unit {
        "ns" => 1,
        "us" | "\u{00b5}s" | "\u{03bc}s" => 1_000,
        "ms" => 1_000_000,
        "s" => 1_000_000_000,
        "m" => 60 * 1_000_000_000,
        "h" => 3_600 * 1_000_000_000,
        _ => return None,
    };
    Some(nanos)
}

/// Parses a Go-style duration string: a sequence of decimal numbers, each
/// with an optional fraction and a unit suffix (`ns`, `us`, `ms`, `s`, `m`,
/// `h`). A bare `0` is accepted. Negative durations are rejected.
pub fn parse_duration(input: &str) -> Result<Duration, DurationError> {
    let invalid = || DurationError::Invalid(input.to_string());

    let mut rest = input.strip_prefix('+').unwrap_or(input);
    if rest.starts_with('-') {
        return Err(DurationError::Negative(input.to_string()));
    }
    if rest == "0" {
        return Ok(Duration::zero());
    }
    if rest.is_empty() {
        return Err(invalid());
    }

    let mut total: u128 = 0;
    while !rest.is_empty() {
        let whole_len = rest.find(|c: char| !c.is_ascii_digit()).unwrap_or(rest.len());
        let (whole, tail) = rest.split_at(whole_len);

        let (fraction, tail) = match tail.strip_prefix('.') {
            Some(after_dot) => {
                let len = after_dot
                    .find(|c: char| !c.is_ascii_digit())
                    .unwrap_or(after_dot.len());
                after_dot.split_at(len)
            }
            None => ("", tail),
        };
        if whole.is_empty() && fraction.is_empty() {
            return Err(invalid());
        }

        let unit_len = tail
            .find(|c: char| c == '.' || c.is_ascii_digit())
            .unwrap_or(tail.len());
        let (unit, tail) = tail.split_at(unit_len);
        if unit.is_empty() {
            return Err(invalid());
        }
        let scale = unit_nanos(unit).ok_or_else(|| DurationError::UnknownUnit {
            unit: unit.to_string(),
            input: input.to_string(),
        })?;

        let overflow = || DurationError::Overflow(input.to_string());
        let whole: u128 = if whole.is_empty() {
            0
        } else {
            whole.parse().map_err(|_| overflow())?
        };
        total = whole
            .checked_mul(scale)
            .and_then(|v| total.checked_add(v))
            .ok_or_else(overflow)?;

        // Fractions beyond nanosecond resolution are truncated.
        if !fraction.is_empty() {
            let digits = &fraction[..fraction.len().min(18)];
            let numerator: u128 = digits.parse().map_err(|_| invalid())?;
            let denominator = 10u128.pow(digits.len() as u32);
            total = total
                .checked_add(numerator * scale / denominator)
                .ok_or_else(overflow)?;
        }

        rest = tail;
    }

    i64::try_from(total)
        .map(Duration::nanoseconds)
        .map_err(|_| DurationError::Overflow(input.to_string()))
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawDuration {
    Nanos(f64),
    Text(String),
}

fn deserialize_duration<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    match RawDuration::deserialize(deserializer)? {
        RawDuration::Nanos(n) if n.is_nan() || n < 0.0 => Err(serde::de::Error::custom(
            format!("duration {n} must be a non-negative number of nanoseconds"),
        )),
        RawDuration::Nanos(n) if n > i64::MAX as f64 => Err(serde::de::Error::custom(
            DurationError::Overflow(n.to_string()),
        )),
        RawDuration::Nanos(n) => Ok(Duration::nanoseconds(n as i64)),
        RawDuration::Text(s) => parse_duration(&s).map_err(serde::de::Error::custom),
    }
}

fn serialize_nanos<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match duration.num_nanoseconds() {
        Some(n) => serializer.serialize_i64(n),
        None => Err(serde::ser::Error::custom("duration too large for nanoseconds")),
    }
}
