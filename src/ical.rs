//! Minimal iCalendar (RFC 5545) writer for all-day events with display
//! alarms.

use chrono::{DateTime, NaiveDate, Utc};

const MAX_LINE_OCTETS: usize = 75;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Calendar {
    prodid: String,
    events: Vec<Event>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    pub uid: String,
    pub stamp: DateTime<Utc>,
    pub start: NaiveDate,
    pub summary: String,
    pub description: String,
    pub alarms: Vec<Alarm>,
}

/// A `VALARM` with `ACTION:DISPLAY`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alarm {
    /// Value of the TRIGGER property, e.g. `-P0DT15H0M0S`.
    pub trigger: String,
    /// DESCRIPTION is required for display alarms.
    pub description: String,
}

impl Calendar {
    pub fn new(prodid: impl Into<String>) -> Self {
        Calendar {
            prodid: prodid.into(),
            events: Vec::new(),
        }
    }

    pub fn push_event(&mut self, event: Event) {
        self.events.push(event);
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn serialize(&self) -> String {
        let mut out = ContentWriter::default();
        out.line("BEGIN", "VCALENDAR");
        out.line("VERSION", "2.0");
        out.line("PRODID", &escape_text(&self.prodid));
        out.line("CALSCALE", "GREGORIAN");
        out.line("METHOD", "PUBLISH");
        for event in &self.events {
            event.write(&mut out);
        }
        out.line("END", "VCALENDAR");
        out.finish()
    }
}

impl Event {
    fn write(&self, out: &mut ContentWriter) {
        // All-day events end (exclusively) on the following day.
        let end = self.start.succ_opt().unwrap_or(self.start);

        out.line("BEGIN", "VEVENT");
        out.line("UID", &escape_text(&self.uid));
        out.line("DTSTAMP", &self.stamp.format("%Y%m%dT%H%M%SZ").to_string());
        out.line("DTSTART;VALUE=DATE", &self.start.format("%Y%m%d").to_string());
        out.line("DTEND;VALUE=DATE", &end.format("%Y%m%d").to_string());
        out.line("SUMMARY", &escape_text(&self.summary));
        if !self.description.is_empty() {
            out.line("DESCRIPTION", &escape_text(&self.description));
        }
        for alarm in &self.alarms {
            out.line("BEGIN", "VALARM");
            out.line("ACTION", "DISPLAY");
            out.line("TRIGGER", &alarm.trigger);
            out.line("DESCRIPTION", &escape_text(&alarm.description));
            out.line("END", "VALARM");
        }
        out.line("END", "VEVENT");
    }
}

#[derive(Default)]
struct ContentWriter {
    buf: String,
}

impl ContentWriter {
    fn line(&mut self, name: &str, value: &str) {
        let line = format!("{name}:{value}");
        fold_into(&mut self.buf, &line);
    }

    fn finish(self) -> String {
        self.buf
    }
}

/// Appends `line` to `out`, folding it so no physical line exceeds 75
/// octets. Continuation lines start with a single space and never split a
/// UTF-8 sequence.
fn fold_into(out: &mut String, line: &str) {
    let mut rest = line;
    let mut limit = MAX_LINE_OCTETS;
    while rest.len() > limit {
        let mut cut = limit;
        while !rest.is_char_boundary(cut) {
            cut -= 1;
        }
        out.push_str(&rest[..cut]);
        out.push_str("\r\n ");
        rest = &rest[cut..];
        // The leading space counts towards the next line.
        limit = MAX_LINE_OCTETS - 1;
    }
    out.push_str(rest);
    out.push_str("\r\n");
}

/// Escapes a TEXT value.
pub fn escape_text(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    let mut chars = value.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\\' => escaped.push_str("\\\\"),
            ';' => escaped.push_str("\\;"),
            ',' => escaped.push_str("\\,"),
            '\r' => {
                if chars.peek() == Some(&'\n') {
                    chars.next();
                }
                escaped.push_str("\\n");
            }
            '\n' => escaped.push_str("\\n"),
            c => escaped.push(c),
        }
    }
    escaped
}
