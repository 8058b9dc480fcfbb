//! mtag CLI library.
//!
//! This crate provides the command-line shell around the timeline canvas.

mod cli;
pub mod commands;
mod config;

pub use cli::{CategoriesAction, Cli, Commands};
pub use config::{Config, LoggingConfig, TimelineConfig};
