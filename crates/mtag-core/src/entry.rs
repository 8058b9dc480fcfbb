//! Logged and tagged time entries and the categories they are filed under.
//!
//! Timestamps are wall-clock readings (`NaiveDateTime`) in the user's local
//! time. A day on the timeline is the calendar date of those readings.

use chrono::{NaiveDateTime, TimeDelta};
use serde::{Deserialize, Serialize};

use crate::color;
use crate::types::{ApplicationId, CategoryId, LoggedEntryId, TaggedEntryId, WindowId};

/// Fallback color for a tagged entry that has no category yet.
pub const UNCATEGORIZED_COLOR: &str = "#00ff00";

/// A program whose windows get focused.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Application {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ApplicationId>,
    pub name: String,
}

/// A single window of an application, identified by its title.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationWindow {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<WindowId>,
    pub application: Application,
    pub title: String,
}

impl ApplicationWindow {
    /// Builds an unsaved window for the given application name and title.
    pub fn new(application: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: None,
            application: Application {
                id: None,
                name: application.into(),
            },
            title: title.into(),
        }
    }

    /// Whether both windows refer to the same application and title.
    pub fn same_window(&self, other: &Self) -> bool {
        self.application.name == other.application.name && self.title == other.title
    }
}

/// An automatically recorded interval of focus on one application window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggedEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<LoggedEntryId>,
    pub start: NaiveDateTime,
    pub stop: NaiveDateTime,
    pub window: ApplicationWindow,
}

impl LoggedEntry {
    pub fn duration(&self) -> TimeDelta {
        self.stop - self.start
    }
}

/// A user-defined label, optionally nested under a main category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<CategoryId>,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<CategoryId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl Category {
    /// Creates an unsaved main category.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
            parent_id: None,
            color: None,
            url: None,
        }
    }

    pub const fn is_main(&self) -> bool {
        self.parent_id.is_none()
    }

    /// The explicit color if one is set, otherwise one derived from the name.
    pub fn display_color(&self) -> String {
        self.color
            .clone()
            .unwrap_or_else(|| color::for_name(&self.name))
    }
}

/// A user-drawn interval filed under a category.
///
/// The category is `None` only while the interval is being drawn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaggedEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<TaggedEntryId>,
    pub start: NaiveDateTime,
    pub stop: NaiveDateTime,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,
}

impl TaggedEntry {
    /// Starts a zero-length, uncategorized entry at `at`.
    pub const fn starting_at(at: NaiveDateTime) -> Self {
        Self {
            id: None,
            start: at,
            stop: at,
            category: None,
        }
    }

    pub fn duration(&self) -> TimeDelta {
        self.stop - self.start
    }

    /// Whether `at` lies within the entry, both ends inclusive.
    pub fn contains(&self, at: NaiveDateTime) -> bool {
        self.start <= at && at <= self.stop
    }

    pub fn display_color(&self) -> String {
        self.category.as_ref().map_or_else(
            || UNCATEGORIZED_COLOR.to_string(),
            Category::display_color,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use chrono::NaiveDate;

    fn at(h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 5)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    #[test]
    fn tagged_entry_contains_both_ends() {
        let entry = TaggedEntry {
            stop: at(10, 30),
            ..TaggedEntry::starting_at(at(10, 0))
        };

        assert!(entry.contains(at(10, 0)));
        assert!(entry.contains(at(10, 15)));
        assert!(entry.contains(at(10, 30)));
        assert!(!entry.contains(at(9, 59)));
        assert!(!entry.contains(at(10, 31)));
    }

    #[test]
    fn uncategorized_entry_uses_fallback_color() {
        let entry = TaggedEntry::starting_at(at(8, 0));
        assert_eq!(entry.display_color(), UNCATEGORIZED_COLOR);
    }

    #[test]
    fn explicit_category_color_wins() {
        let mut category = Category::new("Work");
        assert_eq!(category.display_color(), color::for_name("Work"));

        category.color = Some("#123456".to_string());
        assert_eq!(category.display_color(), "#123456");
    }

    #[test]
    fn same_window_compares_application_and_title() {
        let a = ApplicationWindow::new("firefox", "Docs");
        let b = ApplicationWindow::new("firefox", "Docs");
        let c = ApplicationWindow::new("firefox", "Mail");

        assert!(a.same_window(&b));
        assert!(!a.same_window(&c));
    }

    #[test]
    fn logged_entry_duration() {
        let entry = LoggedEntry {
            id: None,
            start: at(9, 0),
            stop: at(9, 45),
            window: ApplicationWindow::new("term", "vim"),
        };
        assert_eq!(entry.duration(), TimeDelta::minutes(45));
    }
}
