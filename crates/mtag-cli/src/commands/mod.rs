//! CLI subcommand implementations.

pub mod categories;
pub mod day;
pub mod log;
pub mod status;
pub mod tag;
pub mod untag;
pub mod util;
