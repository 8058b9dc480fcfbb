use std::io;
use std::path::Path;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use mtag_cli::commands::tag::{LinePrompt, NamedCategory};
use mtag_cli::commands::{categories, day, log, status, tag, untag};
use mtag_cli::{Cli, Commands, Config};

/// Load config and open database, ensuring the parent directory exists.
fn open_database(config_path: Option<&Path>) -> Result<(mtag_db::Database, Config)> {
    let config = Config::load_from(config_path).context("failed to load configuration")?;
    tracing::debug!(?config, "loaded configuration");

    if let Some(parent) = config.database_path.parent() {
        std::fs::create_dir_all(parent).context("failed to create database directory")?;
    }

    let db = mtag_db::Database::open(&config.database_path).context("failed to open database")?;
    Ok((db, config))
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing with verbose flag support
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env()
    };
    // Use try_init to avoid panic if tracing is already initialized (e.g., in tests)
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();

    let mut stdout = io::stdout().lock();
    match &cli.command {
        Some(Commands::Log(args)) => {
            let (db, config) = open_database(cli.config.as_deref())?;
            let merge_gap = config
                .logging
                .merge_gap()
                .context("invalid logging.merge_gap_secs")?;
            log::run(&mut stdout, &db, args, merge_gap)?;
        }
        Some(Commands::Day(args)) => {
            let (db, config) = open_database(cli.config.as_deref())?;
            day::run(&mut stdout, &db, args, &config.timeline)?;
        }
        Some(Commands::Tag(args)) => {
            let (db, _config) = open_database(cli.config.as_deref())?;
            match &args.category {
                Some(name) => tag::run(&mut stdout, &db, args, &mut NamedCategory(name.clone()))?,
                None => {
                    let mut prompt = LinePrompt::new(io::stdin().lock(), io::stderr());
                    tag::run(&mut stdout, &db, args, &mut prompt)?;
                }
            }
        }
        Some(Commands::Untag(args)) => {
            let (db, _config) = open_database(cli.config.as_deref())?;
            untag::run(&mut stdout, &db, args)?;
        }
        Some(Commands::Categories(action)) => {
            let (db, _config) = open_database(cli.config.as_deref())?;
            categories::run(&mut stdout, &db, action)?;
        }
        Some(Commands::Status) => {
            let (db, config) = open_database(cli.config.as_deref())?;
            status::run(&mut stdout, &db, &config.database_path)?;
        }
        None => {
            // No subcommand, show help
            use clap::CommandFactory;
            Cli::command().print_help()?;
            println!();
        }
    }

    Ok(())
}
