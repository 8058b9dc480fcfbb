//! Mapping between wall-clock time and horizontal pixel position.
//!
//! A timeline shows one [`DayWindow`]: `[00:00:00, 24:00:00)` of a calendar
//! date spread across `[side_padding, width - side_padding)` pixels.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime, TimeDelta, Timelike};
use serde::Serialize;

pub const SECONDS_PER_DAY: u32 = 24 * 60 * 60;

/// Last whole second of a day, used for timestamps at or after midnight.
const LAST_SECOND: u32 = SECONDS_PER_DAY - 1;

/// Keeps the right edge strictly inside the day so it never maps to 24:00.
pub const PIXEL_EPSILON: f64 = 0.000_01;

/// Absorbs float error when dividing a pixel back into seconds.
const ROUNDING_SLACK: f64 = 0.000_001;

/// A single calendar date as the domain of the timeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DayWindow {
    date: NaiveDate,
}

impl DayWindow {
    pub const fn new(date: NaiveDate) -> Self {
        Self { date }
    }

    pub const fn date(&self) -> NaiveDate {
        self.date
    }

    /// Midnight at the start of the day.
    pub fn start(&self) -> NaiveDateTime {
        self.date.and_time(NaiveTime::MIN)
    }

    /// Midnight of the following day (exclusive bound).
    pub fn end(&self) -> NaiveDateTime {
        self.date
            .succ_opt()
            .map_or(NaiveDateTime::MAX, |next| next.and_time(NaiveTime::MIN))
    }

    pub fn contains(&self, at: NaiveDateTime) -> bool {
        self.start() <= at && at < self.end()
    }

    /// Seconds since midnight, clamping out-of-day timestamps to
    /// 00:00:00 or 23:59:59.
    pub fn seconds_into_day(&self, at: NaiveDateTime) -> u32 {
        if at < self.start() {
            0
        } else if at >= self.end() {
            LAST_SECOND
        } else {
            at.time().num_seconds_from_midnight().min(LAST_SECOND)
        }
    }

    /// The timestamp `seconds` after midnight, capped at 23:59:59.
    pub fn at_seconds(&self, seconds: u32) -> NaiveDateTime {
        self.start() + TimeDelta::seconds(i64::from(seconds.min(LAST_SECOND)))
    }
}

/// Pixel geometry of a fixed-width day view.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimelineGeometry {
    width: f64,
    side_padding: f64,
    pixels_per_second: f64,
}

impl TimelineGeometry {
    pub fn new(width: f64, side_padding: f64) -> Self {
        let mut geometry = Self {
            width,
            side_padding,
            pixels_per_second: 0.0,
        };
        geometry.resize(width);
        geometry
    }

    /// Updates the canvas width and the derived scale.
    pub fn resize(&mut self, width: f64) {
        self.width = width;
        let usable = (width - 2.0 * self.side_padding).max(0.0);
        self.pixels_per_second = usable / f64::from(SECONDS_PER_DAY);
    }

    pub const fn width(&self) -> f64 {
        self.width
    }

    pub const fn side_padding(&self) -> f64 {
        self.side_padding
    }

    pub const fn pixels_per_second(&self) -> f64 {
        self.pixels_per_second
    }

    /// Clamps `x` to `[side_padding, width - side_padding - ε)`.
    pub fn clamp_x(&self, x: f64) -> f64 {
        let min_x = self.side_padding;
        let max_x = self.width - self.side_padding - PIXEL_EPSILON;
        x.max(min_x).min(max_x)
    }

    /// X position of the `hour`-th hour line (0 through 24).
    pub fn hour_x(&self, hour: u32) -> f64 {
        let hour_width = (self.width - 2.0 * self.side_padding) / 24.0;
        hour_width.mul_add(f64::from(hour), self.side_padding)
    }

    pub fn time_to_pixel(&self, day: &DayWindow, at: NaiveDateTime) -> f64 {
        let seconds = day.seconds_into_day(at);
        self.pixels_per_second
            .mul_add(f64::from(seconds), self.side_padding)
    }

    /// Inverse of [`Self::time_to_pixel`], truncated to whole seconds.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn pixel_to_time(&self, day: &DayWindow, x: f64) -> NaiveDateTime {
        if self.pixels_per_second <= 0.0 {
            return day.start();
        }
        let x = self.clamp_x(x);
        let total_seconds = (x - self.side_padding) / self.pixels_per_second;
        let seconds = (total_seconds + ROUNDING_SLACK)
            .floor()
            .clamp(0.0, f64::from(LAST_SECOND));
        day.at_seconds(seconds as u32)
    }
}
