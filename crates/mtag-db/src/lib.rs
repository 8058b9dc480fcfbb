//! Storage layer for mtag.
//!
//! Provides persistence for logged entries, tagged entries and categories
//! using `rusqlite`.
//!
//! # Connections
//!
//! Each CLI invocation opens one [`Database`] and hands out `&Database`; the
//! tag command lends it both to the canvas creation handler and, as the
//! [`CategoryRepository`], to the release.
//!
//! # Schema
//!
//! ## Timestamp Format
//!
//! Timestamps are stored as INTEGER epoch seconds of the wall-clock reading,
//! i.e. the local `NaiveDateTime` interpreted as if it were UTC. A day's
//! entries therefore round-trip to the same calendar date regardless of the
//! machine's current offset.
//!
//! ## Entry Ownership
//!
//! Logged entries reference an application window, which references an
//! application. Tagged entries reference a category; subcategories reference
//! their main category. Reads rebuild the full entry through joins.

use std::path::Path;

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeDelta};
use mtag_core::category::{self, CategoryGroup, CategoryRepository, RepositoryError};
use mtag_core::{
    Application, ApplicationId, ApplicationWindow, Category, CategoryId, CategoryName, DayWindow,
    LoggedEntry, LoggedEntryId, TaggedEntry, TaggedEntryId, WindowId,
};
use rusqlite::{Connection, OptionalExtension, params};
use thiserror::Error;

/// Database errors.
#[derive(Debug, Error)]
pub enum DbError {
    /// An error from the underlying database.
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    /// A stored timestamp is outside the representable range.
    #[error("invalid stored timestamp: {0}")]
    InvalidTimestamp(i64),
    /// The category referenced has not been stored yet.
    #[error("category has not been stored")]
    UnsavedCategory,
    /// A subcategory was requested under a missing or non-main category.
    #[error("invalid parent category: {0}")]
    InvalidParent(CategoryId),
}

/// Database connection wrapper.
pub struct Database {
    conn: Connection,
}

/// How a window focus observation was recorded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FocusRecord {
    /// The latest entry was for the same window and got a later stop.
    Extended(LoggedEntry),
    /// A new zero-length entry was started.
    Started(LoggedEntry),
}

/// Row counts per table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StoreCounts {
    pub applications: i64,
    pub windows: i64,
    pub logged_entries: i64,
    pub categories: i64,
    pub tagged_entries: i64,
}

const LOGGED_ENTRY_COLUMNS: &str = "
    SELECT le.id, le.start, le.stop, w.id, w.title, a.id, a.name
    FROM logged_entries le
    JOIN application_windows w ON w.id = le.window_id
    JOIN applications a ON a.id = w.application_id
";

const TAGGED_ENTRY_COLUMNS: &str = "
    SELECT te.id, te.start, te.stop, c.id, c.name, c.parent_id, c.url, c.color
    FROM tagged_entries te
    JOIN categories c ON c.id = te.category_id
";

const CATEGORY_COLUMNS: &str = "SELECT id, name, parent_id, url, color FROM categories";

impl Database {
    /// Opens a database at the given path, creating it if necessary.
    ///
    /// The database schema is automatically initialized on first open.
    pub fn open(path: &Path) -> Result<Self, DbError> {
        tracing::debug!(path = %path.display(), "opening database");
        let conn = Connection::open(path)?;
        let db = Self { conn };
        db.init()?;
        Ok(db)
    }

    /// Opens an in-memory database.
    ///
    /// Useful for testing. The database is destroyed when the connection closes.
    pub fn open_in_memory() -> Result<Self, DbError> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.init()?;
        Ok(db)
    }

    /// Initializes the database schema.
    ///
    /// This is idempotent - safe to call on an already-initialized database.
    fn init(&self) -> Result<(), DbError> {
        self.conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        self.conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS applications (
                id INTEGER PRIMARY KEY,
                name TEXT NOT NULL UNIQUE
            );

            CREATE TABLE IF NOT EXISTS application_windows (
                id INTEGER PRIMARY KEY,
                application_id INTEGER NOT NULL,
                title TEXT NOT NULL,
                UNIQUE (application_id, title),
                FOREIGN KEY (application_id) REFERENCES applications(id) ON DELETE CASCADE
            );

            -- start/stop: epoch seconds of the local wall-clock reading
            CREATE TABLE IF NOT EXISTS logged_entries (
                id INTEGER PRIMARY KEY,
                window_id INTEGER NOT NULL,
                start INTEGER NOT NULL,
                stop INTEGER NOT NULL,
                FOREIGN KEY (window_id) REFERENCES application_windows(id) ON DELETE CASCADE
            );

            CREATE INDEX IF NOT EXISTS idx_logged_entries_start ON logged_entries(start);
            CREATE INDEX IF NOT EXISTS idx_logged_entries_stop ON logged_entries(stop);

            -- parent_id: NULL for main categories
            CREATE TABLE IF NOT EXISTS categories (
                id INTEGER PRIMARY KEY,
                name TEXT NOT NULL,
                parent_id INTEGER,
                url TEXT,
                color TEXT,
                FOREIGN KEY (parent_id) REFERENCES categories(id) ON DELETE CASCADE
            );

            CREATE INDEX IF NOT EXISTS idx_categories_parent ON categories(parent_id);

            CREATE TABLE IF NOT EXISTS tagged_entries (
                id INTEGER PRIMARY KEY,
                category_id INTEGER NOT NULL,
                start INTEGER NOT NULL,
                stop INTEGER NOT NULL,
                FOREIGN KEY (category_id) REFERENCES categories(id) ON DELETE CASCADE
            );

            CREATE INDEX IF NOT EXISTS idx_tagged_entries_start ON tagged_entries(start);
            CREATE INDEX IF NOT EXISTS idx_tagged_entries_stop ON tagged_entries(stop);
            ",
        )?;
        Ok(())
    }

    // ========== Applications ==========

    fn application_id(&self, name: &str) -> Result<ApplicationId, DbError> {
        self.conn.execute(
            "INSERT OR IGNORE INTO applications (name) VALUES (?)",
            params![name],
        )?;
        let id: i64 = self.conn.query_row(
            "SELECT id FROM applications WHERE name = ?",
            params![name],
            |row| row.get(0),
        )?;
        Ok(ApplicationId::new(id))
    }

    fn window_id(&self, application_id: ApplicationId, title: &str) -> Result<WindowId, DbError> {
        self.conn.execute(
            "INSERT OR IGNORE INTO application_windows (application_id, title) VALUES (?, ?)",
            params![application_id.get(), title],
        )?;
        let id: i64 = self.conn.query_row(
            "SELECT id FROM application_windows WHERE application_id = ? AND title = ?",
            params![application_id.get(), title],
            |row| row.get(0),
        )?;
        Ok(WindowId::new(id))
    }

    // ========== Logged entries ==========

    /// Inserts a logged entry, creating its application and window rows on
    /// demand.
    pub fn insert_logged_entry(&self, entry: &LoggedEntry) -> Result<LoggedEntryId, DbError> {
        let application_id = self.application_id(&entry.window.application.name)?;
        let window_id = self.window_id(application_id, &entry.window.title)?;
        self.conn.execute(
            "INSERT INTO logged_entries (window_id, start, stop) VALUES (?, ?, ?)",
            params![window_id.get(), to_epoch(entry.start), to_epoch(entry.stop)],
        )?;
        Ok(LoggedEntryId::new(self.conn.last_insert_rowid()))
    }

    /// Moves the stop of a logged entry.
    pub fn update_logged_entry_stop(
        &self,
        id: LoggedEntryId,
        stop: NaiveDateTime,
    ) -> Result<bool, DbError> {
        let updated = self.conn.execute(
            "UPDATE logged_entries SET stop = ? WHERE id = ?",
            params![to_epoch(stop), id.get()],
        )?;
        Ok(updated > 0)
    }

    /// The logged entry with the latest stop.
    pub fn latest_logged_entry(&self) -> Result<Option<LoggedEntry>, DbError> {
        let row = self
            .conn
            .query_row(
                &format!("{LOGGED_ENTRY_COLUMNS} ORDER BY le.stop DESC, le.id DESC LIMIT 1"),
                [],
                LoggedRow::from_row,
            )
            .optional()?;
        row.map(LoggedRow::into_entry).transpose()
    }

    /// Logged entries starting or stopping within `date`, ordered by start.
    pub fn logged_entries_by_date(&self, date: NaiveDate) -> Result<Vec<LoggedEntry>, DbError> {
        let (from, to) = day_bounds(date);
        let mut stmt = self.conn.prepare(&format!(
            "{LOGGED_ENTRY_COLUMNS}
            WHERE (?1 <= le.stop AND le.stop < ?2) OR (?1 <= le.start AND le.start < ?2)
            ORDER BY le.start ASC, le.id ASC"
        ))?;
        let rows = stmt.query_map(params![from, to], LoggedRow::from_row)?;
        let mut entries = Vec::new();
        for row in rows {
            entries.push(row?.into_entry()?);
        }
        Ok(entries)
    }

    /// Records that `window` was focused at `at`.
    ///
    /// Extends the latest entry when it is for the same window and ended no
    /// more than `merge_gap` before `at`; otherwise starts a new entry.
    pub fn record_focus(
        &self,
        window: &ApplicationWindow,
        at: NaiveDateTime,
        merge_gap: TimeDelta,
    ) -> Result<FocusRecord, DbError> {
        if let Some(mut latest) = self.latest_logged_entry()? {
            let gap = at - latest.stop;
            if latest.window.same_window(window) && gap >= TimeDelta::zero() && gap <= merge_gap {
                if let Some(id) = latest.id {
                    self.update_logged_entry_stop(id, at)?;
                }
                latest.stop = at;
                return Ok(FocusRecord::Extended(latest));
            }
        }

        let mut entry = LoggedEntry {
            id: None,
            start: at,
            stop: at,
            window: window.clone(),
        };
        entry.id = Some(self.insert_logged_entry(&entry)?);
        Ok(FocusRecord::Started(entry))
    }

    // ========== Tagged entries ==========

    /// Inserts a tagged entry. Its category must already be stored.
    pub fn insert_tagged_entry(&self, entry: &TaggedEntry) -> Result<TaggedEntryId, DbError> {
        let category_id = entry
            .category
            .as_ref()
            .and_then(|c| c.id)
            .ok_or(DbError::UnsavedCategory)?;
        self.conn.execute(
            "INSERT INTO tagged_entries (category_id, start, stop) VALUES (?, ?, ?)",
            params![category_id.get(), to_epoch(entry.start), to_epoch(entry.stop)],
        )?;
        let id = TaggedEntryId::new(self.conn.last_insert_rowid());
        tracing::debug!(%id, "stored tagged entry");
        Ok(id)
    }

    /// Deletes a tagged entry. Returns whether a row was removed.
    pub fn delete_tagged_entry(&self, id: TaggedEntryId) -> Result<bool, DbError> {
        let deleted = self
            .conn
            .execute("DELETE FROM tagged_entries WHERE id = ?", params![id.get()])?;
        Ok(deleted > 0)
    }

    /// Tagged entries starting or stopping within `date`, ordered by start.
    pub fn tagged_entries_by_date(&self, date: NaiveDate) -> Result<Vec<TaggedEntry>, DbError> {
        let (from, to) = day_bounds(date);
        let mut stmt = self.conn.prepare(&format!(
            "{TAGGED_ENTRY_COLUMNS}
            WHERE (?1 <= te.stop AND te.stop < ?2) OR (?1 <= te.start AND te.start < ?2)
            ORDER BY te.start ASC, te.id ASC"
        ))?;
        let rows = stmt.query_map(params![from, to], TaggedRow::from_row)?;
        let mut entries = Vec::new();
        for row in rows {
            entries.push(row?.into_entry()?);
        }
        Ok(entries)
    }

    // ========== Categories ==========

    /// Main categories ordered by name, ignoring case.
    pub fn main_categories(&self) -> Result<Vec<Category>, DbError> {
        self.query_categories(
            &format!("{CATEGORY_COLUMNS} WHERE parent_id IS NULL ORDER BY lower(name) ASC, id ASC"),
            params![],
        )
    }

    /// Subcategories of `parent` ordered by name, ignoring case.
    pub fn sub_categories(&self, parent: CategoryId) -> Result<Vec<Category>, DbError> {
        self.query_categories(
            &format!("{CATEGORY_COLUMNS} WHERE parent_id = ? ORDER BY lower(name) ASC, id ASC"),
            params![parent.get()],
        )
    }

    /// Every main category with its subcategories.
    pub fn all_categories(&self) -> Result<Vec<CategoryGroup>, DbError> {
        let mut groups = Vec::new();
        for main in self.main_categories()? {
            let subs = match main.id {
                Some(id) => self.sub_categories(id)?,
                None => Vec::new(),
            };
            groups.push((main, subs));
        }
        Ok(groups)
    }

    pub fn category(&self, id: CategoryId) -> Result<Option<Category>, DbError> {
        let category = self
            .conn
            .query_row(
                &format!("{CATEGORY_COLUMNS} WHERE id = ?"),
                params![id.get()],
                category_from_row,
            )
            .optional()?;
        Ok(category)
    }

    /// Finds a category by name ignoring case; the first match wins.
    pub fn find_category(&self, name: &CategoryName) -> Result<Option<Category>, DbError> {
        let groups = self.all_categories()?;
        Ok(category::find_by_name(&groups, name).cloned())
    }

    /// Stores a category. A parent must be an existing main category.
    pub fn insert_category(
        &self,
        name: &str,
        parent: Option<CategoryId>,
    ) -> Result<CategoryId, DbError> {
        if let Some(parent_id) = parent {
            let is_main = self
                .category(parent_id)?
                .is_some_and(|parent| parent.is_main());
            if !is_main {
                return Err(DbError::InvalidParent(parent_id));
            }
        }
        self.conn.execute(
            "INSERT INTO categories (name, parent_id) VALUES (?, ?)",
            params![name, parent.map(CategoryId::get)],
        )?;
        Ok(CategoryId::new(self.conn.last_insert_rowid()))
    }

    /// Saves the name, URL and color of a stored category.
    pub fn update_category(&self, category: &Category) -> Result<bool, DbError> {
        let id = category.id.ok_or(DbError::UnsavedCategory)?;
        let updated = self.conn.execute(
            "UPDATE categories SET name = ?, url = ?, color = ? WHERE id = ?",
            params![category.name, category.url, category.color, id.get()],
        )?;
        Ok(updated > 0)
    }

    /// Deletes a category with its subcategories and their tagged entries.
    pub fn delete_category(&self, id: CategoryId) -> Result<bool, DbError> {
        let deleted = self
            .conn
            .execute("DELETE FROM categories WHERE id = ?", params![id.get()])?;
        Ok(deleted > 0)
    }

    fn query_categories(
        &self,
        sql: &str,
        params: &[&dyn rusqlite::ToSql],
    ) -> Result<Vec<Category>, DbError> {
        let mut stmt = self.conn.prepare(sql)?;
        let rows = stmt.query_map(params, category_from_row)?;
        let mut categories = Vec::new();
        for row in rows {
            categories.push(row?);
        }
        Ok(categories)
    }

    // ========== Status ==========

    pub fn counts(&self) -> Result<StoreCounts, DbError> {
        let count = |table: &str| -> Result<i64, DbError> {
            Ok(self
                .conn
                .query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| row.get(0))?)
        };
        Ok(StoreCounts {
            applications: count("applications")?,
            windows: count("application_windows")?,
            logged_entries: count("logged_entries")?,
            categories: count("categories")?,
            tagged_entries: count("tagged_entries")?,
        })
    }
}

impl CategoryRepository for Database {
    fn all_categories(&self) -> Result<Vec<CategoryGroup>, RepositoryError> {
        Ok(Self::all_categories(self)?)
    }

    fn insert_category(
        &self,
        name: &str,
        parent: Option<CategoryId>,
    ) -> Result<CategoryId, RepositoryError> {
        Ok(Self::insert_category(self, name, parent)?)
    }
}

#[derive(Debug)]
struct LoggedRow {
    id: i64,
    start: i64,
    stop: i64,
    window_id: i64,
    title: String,
    application_id: i64,
    application: String,
}

impl LoggedRow {
    fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            start: row.get(1)?,
            stop: row.get(2)?,
            window_id: row.get(3)?,
            title: row.get(4)?,
            application_id: row.get(5)?,
            application: row.get(6)?,
        })
    }

    fn into_entry(self) -> Result<LoggedEntry, DbError> {
        Ok(LoggedEntry {
            id: Some(LoggedEntryId::new(self.id)),
            start: from_epoch(self.start)?,
            stop: from_epoch(self.stop)?,
            window: ApplicationWindow {
                id: Some(WindowId::new(self.window_id)),
                application: Application {
                    id: Some(ApplicationId::new(self.application_id)),
                    name: self.application,
                },
                title: self.title,
            },
        })
    }
}

#[derive(Debug)]
struct TaggedRow {
    id: i64,
    start: i64,
    stop: i64,
    category: Category,
}

impl TaggedRow {
    fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            start: row.get(1)?,
            stop: row.get(2)?,
            category: Category {
                id: Some(CategoryId::new(row.get(3)?)),
                name: row.get(4)?,
                parent_id: row.get::<_, Option<i64>>(5)?.map(CategoryId::new),
                url: row.get(6)?,
                color: row.get(7)?,
            },
        })
    }

    fn into_entry(self) -> Result<TaggedEntry, DbError> {
        Ok(TaggedEntry {
            id: Some(TaggedEntryId::new(self.id)),
            start: from_epoch(self.start)?,
            stop: from_epoch(self.stop)?,
            category: Some(self.category),
        })
    }
}

fn category_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Category> {
    Ok(Category {
        id: Some(CategoryId::new(row.get(0)?)),
        name: row.get(1)?,
        parent_id: row.get::<_, Option<i64>>(2)?.map(CategoryId::new),
        url: row.get(3)?,
        color: row.get(4)?,
    })
}

fn to_epoch(at: NaiveDateTime) -> i64 {
    at.and_utc().timestamp()
}

fn from_epoch(seconds: i64) -> Result<NaiveDateTime, DbError> {
    DateTime::from_timestamp(seconds, 0)
        .map(|at| at.naive_utc())
        .ok_or(DbError::InvalidTimestamp(seconds))
}

fn day_bounds(date: NaiveDate) -> (i64, i64) {
    let day = DayWindow::new(date);
    (to_epoch(day.start()), to_epoch(day.end()))
}
