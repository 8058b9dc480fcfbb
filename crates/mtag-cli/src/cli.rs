//! Command-line argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::commands::day::DayArgs;
use crate::commands::log::LogArgs;
use crate::commands::tag::TagArgs;
use crate::commands::untag::UntagArgs;

/// Personal time tagging.
///
/// Records which windows were focused and lets you tag intervals of the day
/// with categories.
#[derive(Debug, Parser)]
#[command(name = "mtag", version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to config file.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Record that a window had focus.
    Log(LogArgs),

    /// Show the timeline, logged entries and category totals of a day.
    Day(DayArgs),

    /// Tag an interval of a day with a category.
    Tag(TagArgs),

    /// Remove the tagged entry under a time.
    Untag(UntagArgs),

    /// Manage categories.
    #[command(subcommand)]
    Categories(CategoriesAction),

    /// Show database location and row counts.
    Status,
}

/// Category subcommands.
#[derive(Debug, Subcommand)]
pub enum CategoriesAction {
    /// List main categories with their subcategories.
    List,

    /// Add a category.
    Add {
        /// Name of the new category.
        name: String,

        /// Main category to nest the new one under.
        #[arg(long)]
        parent: Option<String>,
    },

    /// Set the URL of a category.
    SetUrl {
        name: String,
        url: String,
    },

    /// Set the display color of a category (`#rrggbb`).
    SetColor {
        name: String,
        color: String,
    },

    /// Rename a category.
    Rename {
        name: String,
        new_name: String,
    },

    /// Remove a category, its subcategories and their tagged entries.
    Remove {
        name: String,
    },
}
