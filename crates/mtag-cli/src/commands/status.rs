//! Status command for showing where data lives and how much there is.

use std::io::Write;
use std::path::Path;

use anyhow::Result;
use mtag_db::Database;

pub fn run<W: Write>(writer: &mut W, db: &Database, database_path: &Path) -> Result<()> {
    let counts = db.counts()?;

    writeln!(writer, "mtag status")?;
    writeln!(writer, "Database: {}", database_path.display())?;
    writeln!(writer, "Applications: {}", counts.applications)?;
    writeln!(writer, "Windows: {}", counts.windows)?;
    writeln!(writer, "Logged entries: {}", counts.logged_entries)?;
    writeln!(writer, "Categories: {}", counts.categories)?;
    writeln!(writer, "Tagged entries: {}", counts.tagged_entries)?;

    Ok(())
}
