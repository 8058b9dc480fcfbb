//! Tag command: draws an interval on the timeline canvas.

use std::io::{BufRead, Write};

use anyhow::Result;
use clap::Args;
use mtag_core::summary::{duration_str, time_str};
use mtag_core::{CategoryGroup, CategoryPrompt, DayWindow, ReleaseOutcome, TimelineCanvas};
use mtag_db::Database;

use super::util;

#[derive(Debug, Args)]
pub struct TagArgs {
    /// Start of the interval (HH:MM or HH:MM:SS).
    #[arg(long)]
    pub from: String,
    /// End of the interval (HH:MM or HH:MM:SS).
    #[arg(long)]
    pub to: String,
    /// Day to tag (YYYY-MM-DD, today, yesterday, N days ago).
    #[arg(long)]
    pub date: Option<String>,
    /// Category name. Asked for on stdin when omitted.
    #[arg(long)]
    pub category: Option<String>,
}

/// Answers the category prompt with a fixed name.
#[derive(Debug, Clone)]
pub struct NamedCategory(pub String);

impl CategoryPrompt for NamedCategory {
    fn choose(&mut self, _categories: &[CategoryGroup]) -> Option<String> {
        Some(self.0.clone())
    }
}

/// Lists the known categories and reads a name from a line of input.
///
/// End of input dismisses the prompt.
#[derive(Debug)]
pub struct LinePrompt<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> LinePrompt<R, W> {
    pub const fn new(input: R, output: W) -> Self {
        Self { input, output }
    }
}

impl<R: BufRead, W: Write> CategoryPrompt for LinePrompt<R, W> {
    fn choose(&mut self, categories: &[CategoryGroup]) -> Option<String> {
        if !categories.is_empty() {
            writeln!(self.output, "Categories:").ok()?;
            for (main, subs) in categories {
                writeln!(self.output, "  {}", main.name).ok()?;
                for sub in subs {
                    writeln!(self.output, "    {}", sub.name).ok()?;
                }
            }
        }
        write!(self.output, "Category: ").ok()?;
        self.output.flush().ok()?;

        let mut line = String::new();
        if self.input.read_line(&mut line).ok()? == 0 {
            return None;
        }
        Some(line.trim_end_matches(['\r', '\n']).to_string())
    }
}

pub fn run<W, P>(writer: &mut W, db: &Database, args: &TagArgs, prompt: &mut P) -> Result<()>
where
    W: Write,
    P: CategoryPrompt + ?Sized,
{
    let date = util::date_or_today(args.date.as_deref())?;
    let from = date.and_time(util::parse_time(&args.from)?);
    let to = date.and_time(util::parse_time(&args.to)?);

    let day = DayWindow::new(date);
    let mut canvas = TimelineCanvas::new(util::per_second_geometry(), day);
    canvas.set_entries(
        day,
        db.logged_entries_by_date(date)?,
        db.tagged_entries_by_date(date)?,
    );
    canvas.on_tagged_entry_created(|entry| {
        db.insert_tagged_entry(entry)?;
        Ok(())
    });

    let press = util::pointer_at(&canvas, from);
    let release = util::pointer_at(&canvas, to);
    canvas.on_motion(press);
    canvas.on_press(press);
    canvas.on_motion(release);

    match canvas.on_release(release, db, prompt)? {
        ReleaseOutcome::Created(entry) => {
            let category = entry.category.as_ref().map_or("", |c| c.name.as_str());
            writeln!(
                writer,
                "Tagged {} - {} as {} ({})",
                time_str(entry.start),
                time_str(entry.stop),
                category,
                duration_str(entry.duration())
            )?;
        }
        ReleaseOutcome::Cancelled => writeln!(writer, "Cancelled: no category chosen")?,
        ReleaseOutcome::Idle | ReleaseOutcome::Discarded => {
            writeln!(writer, "Nothing tagged: the interval is empty or already tagged")?;
        }
    }
    Ok(())
}
