//! Log command: records one window focus observation.

use std::io::Write;

use anyhow::{Result, bail};
use chrono::TimeDelta;
use clap::Args;
use mtag_core::ApplicationWindow;
use mtag_core::summary::time_str;
use mtag_db::{Database, FocusRecord};

use super::util;

#[derive(Debug, Args)]
pub struct LogArgs {
    /// Application that had focus.
    #[arg(long)]
    pub app: String,
    /// Title of the focused window.
    #[arg(long, default_value = "")]
    pub title: String,
    /// When the window had focus (YYYY-MM-DDTHH:MM[:SS]). Defaults to now.
    #[arg(long)]
    pub at: Option<String>,
}

pub fn run<W: Write>(
    writer: &mut W,
    db: &Database,
    args: &LogArgs,
    merge_gap: TimeDelta,
) -> Result<()> {
    let app = args.app.trim();
    if app.is_empty() {
        bail!("application cannot be empty");
    }
    let at = match &args.at {
        Some(at) => util::parse_datetime(at)?,
        None => util::now(),
    };

    let window = ApplicationWindow::new(app, args.title.as_str());
    match db.record_focus(&window, at, merge_gap)? {
        FocusRecord::Extended(entry) => {
            tracing::debug!(id = ?entry.id, stop = %entry.stop, "logged entry extended");
            writeln!(
                writer,
                "Extended {} => {} to {}",
                window.application.name,
                window.title,
                time_str(entry.stop)
            )?;
        }
        FocusRecord::Started(entry) => {
            tracing::debug!(id = ?entry.id, start = %entry.start, "logged entry started");
            writeln!(
                writer,
                "Started {} => {} at {}",
                window.application.name,
                window.title,
                time_str(entry.start)
            )?;
        }
    }
    Ok(())
}
