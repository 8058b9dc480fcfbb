//! Draw model for a day on the timeline.
//!
//! The canvas does not paint anything itself. [`Scene`] lists what a shell
//! has to draw: hour lines, one rectangle per entry, the guide line under
//! the cursor and the tooltip of a hovered logged entry.

use serde::Serialize;

use crate::entry::{LoggedEntry, TaggedEntry};
use crate::summary::time_str;
use crate::timeline::{DayWindow, TimelineGeometry};
use crate::{Point, color};

/// Timeline band height as a share of the canvas height.
const BAND_HEIGHT_RATIO: f64 = 0.25;
/// Top padding as a share of the canvas height.
const TOP_PADDING_RATIO: f64 = 0.08;
/// Space between tooltip text and its border.
const TOOLTIP_PADDING: f64 = 10.0;
/// Vertical gap between the two tooltip lines.
const TOOLTIP_LINE_GAP: f64 = 5.0;

/// Measures rendered text. Supplied by whoever draws the scene.
pub trait TextMetrics {
    fn text_width(&self, text: &str) -> f64;
    fn line_height(&self) -> f64;
}

/// Text measured as fixed-width glyphs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MonospaceMetrics {
    pub advance: f64,
    pub height: f64,
}

impl TextMetrics for MonospaceMetrics {
    #[allow(clippy::cast_precision_loss)]
    fn text_width(&self, text: &str) -> f64 {
        text.chars().count() as f64 * self.advance
    }

    fn line_height(&self) -> f64 {
        self.height
    }
}

/// Which horizontal band a rectangle is drawn in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Band {
    /// Tagged entries, including the one being drawn.
    Tagged,
    /// Logged entries.
    Logged,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Rect {
    pub band: Band,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub color: String,
    /// Text a shell may use to label the rectangle.
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HourLine {
    pub hour: u32,
    pub x: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Tooltip {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub lines: [String; 2],
}

/// Everything to draw for one frame.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Scene {
    pub width: f64,
    pub height: f64,
    pub hour_lines: Vec<HourLine>,
    pub rects: Vec<Rect>,
    pub guide_x: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tooltip: Option<Tooltip>,
}

/// Inputs needed to build a [`Scene`].
#[derive(Debug, Clone, Copy)]
pub struct SceneInput<'a> {
    pub geometry: &'a TimelineGeometry,
    pub day: &'a DayWindow,
    pub height: f64,
    pub logged_entries: &'a [LoggedEntry],
    pub tagged_entries: &'a [TaggedEntry],
    pub in_progress: Option<&'a TaggedEntry>,
    pub cursor_x: f64,
    pub pointer: Point,
}

/// Builds the scene for the current canvas state.
pub fn scene(input: &SceneInput<'_>, metrics: &dyn TextMetrics) -> Scene {
    let geometry = input.geometry;
    let band_height = input.height * BAND_HEIGHT_RATIO;
    let top_padding = input.height * TOP_PADDING_RATIO;

    let hour_lines = (0..=24)
        .map(|hour| HourLine {
            hour,
            x: geometry.hour_x(hour),
        })
        .collect();

    let span = |start, stop| {
        let start_x = geometry.time_to_pixel(input.day, start);
        let stop_x = geometry.time_to_pixel(input.day, stop);
        (start_x, stop_x - start_x)
    };

    let mut rects = Vec::new();
    for entry in input.logged_entries {
        let (x, width) = span(entry.start, entry.stop);
        rects.push(Rect {
            band: Band::Logged,
            x,
            y: 2.0f64.mul_add(top_padding, band_height),
            width,
            height: band_height,
            color: color::for_name(&entry.window.application.name),
            label: entry.window.application.name.clone(),
        });
    }
    for entry in input.tagged_entries.iter().chain(input.in_progress) {
        let (x, width) = span(entry.start, entry.stop);
        rects.push(Rect {
            band: Band::Tagged,
            x,
            y: top_padding,
            width,
            height: band_height,
            color: entry.display_color(),
            label: entry
                .category
                .as_ref()
                .map(|c| c.name.clone())
                .unwrap_or_default(),
        });
    }

    let tooltip = hovered_entry(input, input.pointer.x)
        .map(|entry| tooltip(entry, input.pointer, geometry.width(), metrics));

    Scene {
        width: geometry.width(),
        height: input.height,
        hour_lines,
        rects,
        guide_x: input.cursor_x,
        tooltip,
    }
}

/// The logged entry under `x`, walking entries in start order.
fn hovered_entry<'a>(input: &SceneInput<'a>, x: f64) -> Option<&'a LoggedEntry> {
    for entry in input.logged_entries {
        if input.geometry.time_to_pixel(input.day, entry.stop) < x {
            continue;
        }
        if x < input.geometry.time_to_pixel(input.day, entry.start) {
            return None;
        }
        return Some(entry);
    }
    None
}

fn tooltip(entry: &LoggedEntry, pointer: Point, canvas_width: f64, metrics: &dyn TextMetrics) -> Tooltip {
    let interval = format!("{} => {}", time_str(entry.start), time_str(entry.stop));
    let title = format!("{} => {}", entry.window.application.name, entry.window.title);

    let line_height = metrics.line_height();
    let text_width = metrics
        .text_width(&interval)
        .max(metrics.text_width(&title));
    let width = 2.0f64.mul_add(TOOLTIP_PADDING, text_width);
    let height = 2.0f64.mul_add(TOOLTIP_PADDING, 2.0f64.mul_add(line_height, TOOLTIP_LINE_GAP));

    Tooltip {
        x: pointer.x.min(canvas_width - width).max(0.0),
        y: pointer.y,
        width,
        height,
        lines: [interval, title],
    }
}
