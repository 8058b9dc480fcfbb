//! Core domain logic for mtag.
//!
//! This crate contains the fundamental types and logic for:
//! - Timeline geometry: mapping wall-clock time to pixels and back
//! - Interaction: turning pointer drags into tagged entries
//! - Overlap resolution against already tagged intervals
//! - Categories, colors and per-category summaries

pub mod canvas;
pub mod category;
pub mod color;
pub mod entry;
pub mod overlap;
pub mod render;
pub mod summary;
pub mod timeline;
pub mod types;

pub use canvas::{HandlerError, InteractionError, Point, ReleaseOutcome, TimelineCanvas};
pub use category::{CategoryGroup, CategoryPrompt, CategoryRepository, RepositoryError};
pub use entry::{Application, ApplicationWindow, Category, LoggedEntry, TaggedEntry};
pub use render::{MonospaceMetrics, Scene, TextMetrics};
pub use summary::CategoryTotal;
pub use timeline::{DayWindow, TimelineGeometry};
pub use types::{
    ApplicationId, CategoryId, CategoryName, LoggedEntryId, TaggedEntryId, ValidationError,
    WindowId,
};
