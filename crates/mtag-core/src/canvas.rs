//! The interactive day timeline.
//!
//! [`TimelineCanvas`] tracks pointer motion, press and release and turns a
//! drag into a new [`TaggedEntry`]:
//!
//! - **Press** starts an uncategorized zero-length entry at the cursor.
//! - **Motion** while dragging moves the stop, clamped against committed
//!   entries. While idle, the cursor snaps to the nearer boundary of a
//!   tagged entry under the pointer.
//! - **Release** finalizes the stop. A zero-length drag is dropped; otherwise
//!   the user picks a category and the created handlers run.
//!
//! The canvas never stores what it emits. Handlers persist the entry and the
//! shell hands the reloaded lists back through [`TimelineCanvas::set_entries`].

use std::error::Error;
use std::fmt;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::category::{self, CategoryPrompt, CategoryRepository, RepositoryError};
use crate::entry::{LoggedEntry, TaggedEntry};
use crate::overlap;
use crate::render::{self, Scene, SceneInput, TextMetrics};
use crate::timeline::{DayWindow, TimelineGeometry};
use crate::types::{CategoryName, ValidationError};

/// Boxed error returned by event handlers.
pub type HandlerError = Box<dyn Error + Send + Sync>;

type Handler<'a> = Box<dyn FnMut(&TaggedEntry) -> Result<(), HandlerError> + 'a>;

/// Errors raised while finishing an interaction.
#[derive(Debug, Error)]
pub enum InteractionError {
    /// The typed category name was not usable.
    #[error(transparent)]
    InvalidCategory(#[from] ValidationError),
    /// Loading or storing categories failed.
    #[error("category repository failed")]
    Repository(#[source] RepositoryError),
    /// A registered handler failed.
    #[error("{event} handler failed")]
    Handler {
        event: &'static str,
        #[source]
        source: HandlerError,
    },
}

/// Pointer position in canvas pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Result of releasing the pointer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReleaseOutcome {
    /// No drag was in progress.
    Idle,
    /// The drag had zero duration after clamping.
    Discarded,
    /// The category prompt was dismissed.
    Cancelled,
    /// A new entry was emitted to the created handlers.
    Created(TaggedEntry),
}

/// Interaction state and geometry of one day's timeline.
pub struct TimelineCanvas<'a> {
    geometry: TimelineGeometry,
    day: DayWindow,
    logged_entries: Vec<LoggedEntry>,
    tagged_entries: Vec<TaggedEntry>,
    in_progress: Option<TaggedEntry>,
    cursor_x: f64,
    pointer: Point,
    created_handlers: Vec<Handler<'a>>,
    deleted_handlers: Vec<Handler<'a>>,
}

impl fmt::Debug for TimelineCanvas<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TimelineCanvas")
            .field("geometry", &self.geometry)
            .field("day", &self.day)
            .field("logged_entries", &self.logged_entries.len())
            .field("tagged_entries", &self.tagged_entries.len())
            .field("in_progress", &self.in_progress)
            .field("cursor_x", &self.cursor_x)
            .finish_non_exhaustive()
    }
}

impl<'a> TimelineCanvas<'a> {
    pub const fn new(geometry: TimelineGeometry, day: DayWindow) -> Self {
        Self {
            geometry,
            day,
            logged_entries: Vec::new(),
            tagged_entries: Vec::new(),
            in_progress: None,
            cursor_x: 0.0,
            pointer: Point { x: 0.0, y: 0.0 },
            created_handlers: Vec::new(),
            deleted_handlers: Vec::new(),
        }
    }

    /// Replaces the day and its entry lists.
    pub fn set_entries(
        &mut self,
        day: DayWindow,
        logged_entries: Vec<LoggedEntry>,
        tagged_entries: Vec<TaggedEntry>,
    ) {
        tracing::debug!(
            date = %day.date(),
            logged = logged_entries.len(),
            tagged = tagged_entries.len(),
            "timeline entries set"
        );
        self.day = day;
        self.logged_entries = logged_entries;
        self.tagged_entries = tagged_entries;
    }

    pub fn resize(&mut self, width: f64) {
        self.geometry.resize(width);
    }

    /// Registers a handler run for every created entry.
    pub fn on_tagged_entry_created<F>(&mut self, handler: F)
    where
        F: FnMut(&TaggedEntry) -> Result<(), HandlerError> + 'a,
    {
        self.created_handlers.push(Box::new(handler));
    }

    /// Registers a handler run for every entry the user deletes.
    pub fn on_tagged_entry_deleted<F>(&mut self, handler: F)
    where
        F: FnMut(&TaggedEntry) -> Result<(), HandlerError> + 'a,
    {
        self.deleted_handlers.push(Box::new(handler));
    }

    pub const fn geometry(&self) -> &TimelineGeometry {
        &self.geometry
    }

    pub const fn day(&self) -> &DayWindow {
        &self.day
    }

    pub fn logged_entries(&self) -> &[LoggedEntry] {
        &self.logged_entries
    }

    pub fn tagged_entries(&self) -> &[TaggedEntry] {
        &self.tagged_entries
    }

    /// The entry being dragged, if any.
    pub const fn in_progress(&self) -> Option<&TaggedEntry> {
        self.in_progress.as_ref()
    }

    pub const fn is_dragging(&self) -> bool {
        self.in_progress.is_some()
    }

    /// X position of the guide line, after snapping or clamping.
    pub const fn cursor_x(&self) -> f64 {
        self.cursor_x
    }

    pub const fn pointer(&self) -> Point {
        self.pointer
    }

    pub fn time_to_pixel(&self, at: NaiveDateTime) -> f64 {
        self.geometry.time_to_pixel(&self.day, at)
    }

    /// Time under `x`, after clamping `x` into the day.
    pub fn time_at(&self, x: f64) -> NaiveDateTime {
        self.geometry
            .pixel_to_time(&self.day, self.geometry.clamp_x(x))
    }

    pub fn on_motion(&mut self, point: Point) {
        let at = self.time_at(point.x);

        let boundary = match self.in_progress.as_mut() {
            Some(entry) => drag_stop(at, entry, &self.tagged_entries),
            None => snap_boundary(&self.tagged_entries, at),
        };

        self.cursor_x = boundary.map_or(point.x, |b| self.geometry.time_to_pixel(&self.day, b));
        self.pointer = point;
    }

    pub fn on_press(&mut self, point: Point) {
        self.on_motion(point);
        let start = self.time_at(self.cursor_x);
        tracing::debug!(%start, "drag started");
        self.in_progress = Some(TaggedEntry::starting_at(start));
    }

    /// Finishes a drag.
    ///
    /// Blocks on `prompt` for the category. A novel category name is stored
    /// through `categories` before the created handlers run.
    pub fn on_release<R, P>(
        &mut self,
        point: Point,
        categories: &R,
        prompt: &mut P,
    ) -> Result<ReleaseOutcome, InteractionError>
    where
        R: CategoryRepository + ?Sized,
        P: CategoryPrompt + ?Sized,
    {
        let Some(mut entry) = self.in_progress.take() else {
            return Ok(ReleaseOutcome::Idle);
        };

        let at = self.time_at(point.x);
        drag_stop(at, &mut entry, &self.tagged_entries);
        if entry.start == entry.stop {
            tracing::debug!(start = %entry.start, "zero-length drag discarded");
            return Ok(ReleaseOutcome::Discarded);
        }
        if entry.stop < entry.start {
            std::mem::swap(&mut entry.start, &mut entry.stop);
        }

        let known = categories
            .all_categories()
            .map_err(InteractionError::Repository)?;
        let Some(typed) = prompt.choose(&known) else {
            tracing::debug!("category prompt cancelled");
            return Ok(ReleaseOutcome::Cancelled);
        };
        let name = CategoryName::new(typed)?;
        let category =
            category::resolve(categories, &known, &name).map_err(InteractionError::Repository)?;
        entry.category = Some(category);

        tracing::info!(
            start = %entry.start,
            stop = %entry.stop,
            category = %name,
            "tagged entry created"
        );
        emit(&mut self.created_handlers, "tagged-entry-created", &entry)?;
        Ok(ReleaseOutcome::Created(entry))
    }

    /// Deletes the committed entry under `point`, if there is one.
    pub fn on_delete_request(
        &mut self,
        point: Point,
    ) -> Result<Option<TaggedEntry>, InteractionError> {
        let at = self.time_at(point.x);
        let Some(entry) = self.tagged_entries.iter().find(|t| t.contains(at)).cloned() else {
            return Ok(None);
        };
        tracing::info!(start = %entry.start, stop = %entry.stop, "tagged entry deleted");
        emit(&mut self.deleted_handlers, "tagged-entry-deleted", &entry)?;
        Ok(Some(entry))
    }

    /// Builds the draw model for a canvas `height` pixels tall.
    pub fn scene(&self, height: f64, metrics: &dyn TextMetrics) -> Scene {
        let input = SceneInput {
            geometry: &self.geometry,
            day: &self.day,
            height,
            logged_entries: &self.logged_entries,
            tagged_entries: &self.tagged_entries,
            in_progress: self.in_progress.as_ref(),
            cursor_x: self.cursor_x,
            pointer: self.pointer,
        };
        render::scene(&input, metrics)
    }
}

/// Nearer boundary of the first tagged entry containing `at`.
/// Moves the stop of a dragged entry to `at`, kept clear of committed entries.
fn drag_stop(
    at: NaiveDateTime,
    entry: &mut TaggedEntry,
    committed: &[TaggedEntry],
) -> Option<NaiveDateTime> {
    let clamp = overlap::set_stop(at, entry, committed);
    overlap::keep_out(entry, committed).or(clamp)
}

fn snap_boundary(tagged_entries: &[TaggedEntry], at: NaiveDateTime) -> Option<NaiveDateTime> {
    tagged_entries.iter().find(|t| t.contains(at)).map(|t| {
        let start_delta = at - t.start;
        let stop_delta = t.stop - at;
        if start_delta < stop_delta {
            t.start
        } else {
            t.stop
        }
    })
}

fn emit(
    handlers: &mut [Handler<'_>],
    event: &'static str,
    entry: &TaggedEntry,
) -> Result<(), InteractionError> {
    for handler in handlers {
        handler(entry).map_err(|source| InteractionError::Handler { event, source })?;
    }
    Ok(())
}
