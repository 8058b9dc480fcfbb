//! Untag command: removes the tagged entry under a time.

use std::io::Write;

use anyhow::Result;
use clap::Args;
use mtag_core::summary::time_str;
use mtag_core::{DayWindow, TimelineCanvas};
use mtag_db::Database;

use super::util;

#[derive(Debug, Args)]
pub struct UntagArgs {
    /// Time inside the entry to remove (HH:MM or HH:MM:SS).
    #[arg(long)]
    pub at: String,
    /// Day of the entry (YYYY-MM-DD, today, yesterday, N days ago).
    #[arg(long)]
    pub date: Option<String>,
}

pub fn run<W: Write>(writer: &mut W, db: &Database, args: &UntagArgs) -> Result<()> {
    let date = util::date_or_today(args.date.as_deref())?;
    let at = date.and_time(util::parse_time(&args.at)?);

    let day = DayWindow::new(date);
    let mut canvas = TimelineCanvas::new(util::per_second_geometry(), day);
    canvas.set_entries(day, Vec::new(), db.tagged_entries_by_date(date)?);
    canvas.on_tagged_entry_deleted(|entry| {
        if let Some(id) = entry.id {
            db.delete_tagged_entry(id)?;
        }
        Ok(())
    });

    let point = util::pointer_at(&canvas, at);
    match canvas.on_delete_request(point)? {
        Some(entry) => {
            let category = entry.category.as_ref().map_or("", |c| c.name.as_str());
            writeln!(
                writer,
                "Removed {} - {} ({})",
                time_str(entry.start),
                time_str(entry.stop),
                category
            )?;
        }
        None => writeln!(writer, "No tagged entry at {}", time_str(at))?,
    }
    Ok(())
}
