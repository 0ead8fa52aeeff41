//! Calendar bucketing for runs: week anchors, month keys and source date parsing.
//!
//! All arithmetic is on naive local dates, so a run logged late in the evening can never
//! slip into a neighbouring day (and week) through a timezone conversion.

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime};

pub fn parse_run_date(input: &str) -> Option<NaiveDate> {
    let input = input.trim();
    NaiveDate::parse_from_str(input, "%Y-%m-%d")
        .or_else(|_| NaiveDateTime::parse_from_str(input, "%Y-%m-%dT%H:%M:%S").map(|dt| dt.date()))
        .or_else(|_| NaiveDateTime::parse_from_str(input, "%Y-%m-%d %H:%M:%S").map(|dt| dt.date()))
        .ok()
}

pub fn date_key(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Monday on or before `date`.
pub fn week_key_for_date(date: NaiveDate) -> NaiveDate {
    date - Duration::days(date.weekday().num_days_from_monday() as i64)
}

pub fn week_key(date: NaiveDate) -> String {
    date_key(week_key_for_date(date))
}

pub fn month_key_for_date(date: NaiveDate) -> String {
    format!("{}-{}", date.year(), date.month())
}

/// Week anchors from `start`, stepping 7 days while the anchor is `<= end`.
///
/// `start` is used as-is; callers wanting Monday buckets pass it through
/// [`week_key_for_date`] first.
pub fn generate_weeks(start: NaiveDate, end: NaiveDate) -> WeekAnchors {
    WeekAnchors {
        next: Some(start),
        end,
    }
}

#[derive(Debug, Clone)]
pub struct WeekAnchors {
    next: Option<NaiveDate>,
    end: NaiveDate,
}

impl Iterator for WeekAnchors {
    type Item = NaiveDate;

    fn next(&mut self) -> Option<NaiveDate> {
        let current = self.next.filter(|date| *date <= self.end)?;
        self.next = current.checked_add_signed(Duration::weeks(1));
        Some(current)
    }
}
