//! Text encodings for the values SQLite has no native type for.

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};

use crate::domain::models::TransactionKind;

pub fn format_timestamp(timestamp: &DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, sqlx::Error> {
    DateTime::parse_from_rfc3339(raw)
        .map(|parsed| parsed.with_timezone(&Utc))
        .map_err(|e| sqlx::Error::Decode(Box::new(e)))
}

pub fn format_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

pub fn parse_date(raw: &str) -> Result<NaiveDate, sqlx::Error> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|e| sqlx::Error::Decode(Box::new(e)))
}

pub fn parse_kind(raw: &str) -> Result<TransactionKind, sqlx::Error> {
    TransactionKind::parse(raw)
        .ok_or_else(|| sqlx::Error::Decode(format!("unknown transaction kind: {}", raw).into()))
}

/// First instant of `date` in the timestamp encoding
pub fn start_of_day(date: NaiveDate) -> String {
    format!("{}T00:00:00.000000Z", format_date(date))
}

/// Last representable instant of `date` in the timestamp encoding
pub fn end_of_day(date: NaiveDate) -> String {
    format!("{}T23:59:59.999999Z", format_date(date))
}
