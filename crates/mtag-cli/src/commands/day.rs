//! Day command: the timeline, entries and category totals of one date.

use std::io::Write;

use anyhow::Result;
use chrono::NaiveDate;
use clap::Args;
use mtag_core::render::Band;
use mtag_core::summary::{self, duration_str, time_str};
use mtag_core::{
    CategoryTotal, DayWindow, LoggedEntry, MonospaceMetrics, Scene, TaggedEntry, TimelineCanvas,
};
use mtag_db::Database;
use serde::Serialize;

use super::util;
use crate::TimelineConfig;

/// One text cell per pixel; the scene height only scales the bands.
const METRICS: MonospaceMetrics = MonospaceMetrics {
    advance: 1.0,
    height: 1.0,
};
const SCENE_HEIGHT: f64 = 100.0;

/// Keeps rectangle edges that sit on a cell boundary from spilling over.
const CELL_SLACK: f64 = 0.000_001;

/// Hours labeled on the ruler.
const LABEL_EVERY: u32 = 6;

#[derive(Debug, Args)]
pub struct DayArgs {
    /// Day to show (YYYY-MM-DD, today, yesterday, N days ago).
    #[arg(long)]
    pub date: Option<String>,
    /// Output as JSON.
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Serialize)]
struct DayReport<'a> {
    date: NaiveDate,
    scene: &'a Scene,
    logged_entries: &'a [LoggedEntry],
    tagged_entries: &'a [TaggedEntry],
    summary: &'a [CategoryTotal],
}

pub fn run<W: Write>(
    writer: &mut W,
    db: &Database,
    args: &DayArgs,
    timeline: &TimelineConfig,
) -> Result<()> {
    let date = util::date_or_today(args.date.as_deref())?;
    let day = DayWindow::new(date);

    let mut canvas = TimelineCanvas::new(timeline.geometry(), day);
    canvas.set_entries(
        day,
        db.logged_entries_by_date(date)?,
        db.tagged_entries_by_date(date)?,
    );
    let scene = canvas.scene(SCENE_HEIGHT, &METRICS);
    let totals = summary::by_category(canvas.tagged_entries());

    if args.json {
        let report = DayReport {
            date,
            scene: &scene,
            logged_entries: canvas.logged_entries(),
            tagged_entries: canvas.tagged_entries(),
            summary: &totals,
        };
        serde_json::to_writer_pretty(&mut *writer, &report)?;
        writeln!(writer)?;
        return Ok(());
    }

    writeln!(writer, "{}", date.format("%Y-%m-%d (%a)"))?;
    let [ruler, tagged, logged] = timeline_rows(&scene);
    writeln!(writer, "hours  {ruler}")?;
    writeln!(writer, "tagged {tagged}")?;
    writeln!(writer, "logged {logged}")?;
    writeln!(writer)?;

    if canvas.tagged_entries().is_empty() {
        writeln!(writer, "No tagged entries.")?;
    } else {
        writeln!(writer, "Tagged entries:")?;
        for entry in canvas.tagged_entries() {
            let category = entry
                .category
                .as_ref()
                .map_or(summary::UNCATEGORIZED, |c| c.name.as_str());
            writeln!(
                writer,
                "{}  {}  {:>7}  {}",
                time_str(entry.start),
                time_str(entry.stop),
                duration_str(entry.duration()),
                category
            )?;
        }
    }
    writeln!(writer)?;

    if canvas.logged_entries().is_empty() {
        writeln!(writer, "No logged entries.")?;
    } else {
        writeln!(writer, "Logged entries:")?;
        for entry in canvas.logged_entries() {
            writeln!(
                writer,
                "{}  {}  {:>7}  {} => {}",
                time_str(entry.start),
                time_str(entry.stop),
                duration_str(entry.duration()),
                entry.window.application.name,
                entry.window.title
            )?;
        }
    }

    if !totals.is_empty() {
        writeln!(writer)?;
        writeln!(writer, "Summary:")?;
        let name_width = totals
            .iter()
            .map(|total| total.category.chars().count())
            .max()
            .unwrap_or(0);
        for total in &totals {
            writeln!(
                writer,
                "{:<name_width$}  {}",
                total.category,
                duration_str(total.duration)
            )?;
        }
    }

    Ok(())
}

/// Renders the hour ruler, tagged band and logged band as text rows.
fn timeline_rows(scene: &Scene) -> [String; 3] {
    let columns = cell(scene.width.round(), usize::MAX);

    let mut ruler = vec![' '; columns];
    for line in &scene.hour_lines {
        if let Some(slot) = ruler.get_mut(cell(line.x + CELL_SLACK, columns)) {
            *slot = '|';
        }
    }
    for line in scene.hour_lines.iter().filter(|l| l.hour % LABEL_EVERY == 0) {
        let label = format!("{:02}", line.hour);
        let first = cell(line.x + CELL_SLACK, columns);
        if first + label.len() <= columns {
            for (slot, ch) in ruler[first..].iter_mut().zip(label.chars()) {
                *slot = ch;
            }
        }
    }

    let mut tagged = vec!['.'; columns];
    let mut logged = vec!['.'; columns];
    for rect in &scene.rects {
        let band = match rect.band {
            Band::Tagged => &mut tagged,
            Band::Logged => &mut logged,
        };
        let mark = rect.label.chars().next().unwrap_or('#');
        let first = cell(rect.x + CELL_SLACK, columns);
        let last = cell((rect.x + rect.width - CELL_SLACK).ceil(), columns).max(first + 1);
        for slot in band.iter_mut().take(last).skip(first) {
            *slot = mark;
        }
    }

    [ruler, tagged, logged].map(|row| row.into_iter().collect())
}

/// Column index of `x`, clamped to `[0, columns]`.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn cell(x: f64, columns: usize) -> usize {
    (x.floor().max(0.0) as usize).min(columns)
}

#[cfg(test)]
mod tests {
    use super::*;

    use chrono::NaiveDateTime;
    use insta::assert_snapshot;
    use mtag_core::ApplicationWindow;

    /// One column per hour between one-column paddings.
    const NARROW: TimelineConfig = TimelineConfig {
        width: 26.0,
        side_padding: 1.0,
    };

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 5).unwrap()
    }

    fn at(h: u32, m: u32) -> NaiveDateTime {
        date().and_hms_opt(h, m, 0).unwrap()
    }

    fn seed(db: &Database) {
        for (start, stop, app, title) in [
            (at(9, 0), at(9, 30), "term", "vim"),
            (at(13, 0), at(14, 15), "firefox", "Docs"),
        ] {
            db.insert_logged_entry(&LoggedEntry {
                id: None,
                start,
                stop,
                window: ApplicationWindow::new(app, title),
            })
            .unwrap();
        }
        let work = db.insert_category("Work", None).unwrap();
        db.insert_tagged_entry(&TaggedEntry {
            id: None,
            start: at(9, 0),
            stop: at(11, 0),
            category: db.category(work).unwrap(),
        })
        .unwrap();
    }

    fn day(db: &Database, json: bool) -> String {
        let args = DayArgs {
            date: Some("2024-03-05".to_string()),
            json,
        };
        let mut output = Vec::new();
        run(&mut output, db, &args, &NARROW).unwrap();
        String::from_utf8(output).unwrap()
    }

    #[test]
    fn day_renders_timeline_tables_and_summary() {
        let db = Database::open_in_memory().unwrap();
        seed(&db);

        let output = day(&db, false);

        assert_snapshot!(output, @r"
        2024-03-05 (Tue)
        hours   00||||06||||12||||18|||||
        tagged ..........WW..............
        logged ..........t...ff..........

        Tagged entries:
        09:00:00  11:00:00    2h 0m  Work

        Logged entries:
        09:00:00  09:30:00      30m  term => vim
        13:00:00  14:15:00   1h 15m  firefox => Docs

        Summary:
        Work  2h 0m
        ");
    }

    #[test]
    fn empty_day() {
        let db = Database::open_in_memory().unwrap();

        let output = day(&db, false);

        assert_snapshot!(output, @r"
        2024-03-05 (Tue)
        hours   00||||06||||12||||18|||||
        tagged ..........................
        logged ..........................

        No tagged entries.

        No logged entries.
        ");
    }

    #[test]
    fn day_as_json() {
        let db = Database::open_in_memory().unwrap();
        seed(&db);

        let output = day(&db, true);
        let value: serde_json::Value = serde_json::from_str(&output).unwrap();

        assert_eq!(value["date"], "2024-03-05");
        assert_eq!(value["logged_entries"].as_array().unwrap().len(), 2);
        assert_eq!(value["tagged_entries"][0]["category"]["name"], "Work");
        assert_eq!(value["summary"][0]["category"], "Work");
        assert_eq!(value["summary"][0]["duration"], 7200);
        assert_eq!(value["scene"]["hour_lines"].as_array().unwrap().len(), 25);
        assert_eq!(value["scene"]["rects"].as_array().unwrap().len(), 3);
    }

    #[test]
    fn zero_length_entry_fills_one_cell() {
        let db = Database::open_in_memory().unwrap();
        db.insert_logged_entry(&LoggedEntry {
            id: None,
            start: at(0, 0),
            stop: at(0, 0),
            window: ApplicationWindow::new("xterm", ""),
        })
        .unwrap();

        let output = day(&db, false);

        let logged_row = output.lines().nth(3).unwrap();
        assert_eq!(logged_row, "logged .x........................");
    }
}
