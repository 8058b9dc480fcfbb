//! Shared utilities for CLI commands.

use std::sync::LazyLock;

use anyhow::Context;
use chrono::{Local, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta, Timelike};
use mtag_core::timeline::SECONDS_PER_DAY;
use mtag_core::{Point, TimelineCanvas, TimelineGeometry};
use regex::Regex;

/// Pre-compiled regex for relative date parsing.
static RELATIVE_DATE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+)\s+days?\s+ago$").unwrap());

/// Conservative bound for relative dates (~1000 years).
const MAX_RELATIVE_DAYS: i64 = 1000 * 365;

/// Parse a date relative to `today`.
///
/// Supports:
/// - ISO 8601: "2024-03-05"
/// - "today", "yesterday"
/// - Relative: "3 days ago", "1 day ago"
pub fn parse_date(s: &str, today: NaiveDate) -> anyhow::Result<NaiveDate> {
    let s = s.trim();
    match s {
        "today" => return Ok(today),
        "yesterday" => return Ok(today - TimeDelta::days(1)),
        _ => {}
    }

    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Ok(date);
    }

    let Some(caps) = RELATIVE_DATE_RE.captures(s) else {
        anyhow::bail!(
            "Invalid date: {s}. Use YYYY-MM-DD, 'today', 'yesterday' or relative (e.g., '3 days ago')"
        );
    };

    let n: i64 = caps[1]
        .parse()
        .context("failed to parse number in relative date")?;
    if n > MAX_RELATIVE_DAYS {
        anyhow::bail!("Relative date value too large: {n} days");
    }

    Ok(today - TimeDelta::days(n))
}

/// Parse an optional `--date` argument, defaulting to today.
pub fn date_or_today(s: Option<&str>) -> anyhow::Result<NaiveDate> {
    let today = Local::now().date_naive();
    s.map_or(Ok(today), |s| parse_date(s, today))
}

/// Parse a time of day as "HH:MM" or "HH:MM:SS".
pub fn parse_time(s: &str) -> anyhow::Result<NaiveTime> {
    let s = s.trim();
    NaiveTime::parse_from_str(s, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(s, "%H:%M"))
        .with_context(|| format!("Invalid time: {s}. Use HH:MM or HH:MM:SS"))
}

/// Parse a local datetime as "YYYY-MM-DDTHH:MM" or "YYYY-MM-DDTHH:MM:SS".
pub fn parse_datetime(s: &str) -> anyhow::Result<NaiveDateTime> {
    let s = s.trim();
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S")
        .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M"))
        .with_context(|| format!("Invalid datetime: {s}. Use YYYY-MM-DDTHH:MM[:SS]"))
}

/// The current local wall-clock time, to the second.
pub fn now() -> NaiveDateTime {
    let now = Local::now().naive_local();
    now.with_nanosecond(0).unwrap_or(now)
}

/// Canvas geometry with one pixel per second, so pointer events can address
/// every second of the day.
pub fn per_second_geometry() -> TimelineGeometry {
    TimelineGeometry::new(f64::from(SECONDS_PER_DAY) + 2.0, 1.0)
}

/// Pointer position over `at` on the canvas.
pub fn pointer_at(canvas: &TimelineCanvas<'_>, at: NaiveDateTime) -> Point {
    Point::new(canvas.time_to_pixel(at), 0.0)
}
