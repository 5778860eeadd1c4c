//! CLI module for Resource Cache
//!
//! Provides subcommands for inspecting a configured cache:
//! - `resources`: list the resource types the cache is bound to
//! - `query`: seed the cache from a JSON file and run a read
//! - `dump`: seed the cache and print its diagnostic listing

pub mod dump;
pub mod query;
pub mod resources;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::config::AppConfig;
use crate::infrastructure::logging;

/// Resource Cache - attribute-level object cache with all-or-none reads
#[derive(Parser)]
#[command(name = "resource-cache")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// List the resource types bound to the configured cache
    Resources,

    /// Seed the cache and read from it
    Query(query::QueryArgs),

    /// Seed the cache and print every collection
    Dump(SeedArgs),
}

/// Seed file shared by commands that pre-populate the cache
#[derive(Args, Clone)]
pub struct SeedArgs {
    /// JSON seed file: {"<resource>": {"<key>": {attributes}}}
    #[arg(long)]
    pub seed: PathBuf,

    /// Category the seed is loaded under
    #[arg(long, default_value = "default")]
    pub category: String,
}

/// Loads `.env` and configuration, then installs logging
fn bootstrap() -> anyhow::Result<AppConfig> {
    dotenvy::dotenv().ok();

    let config = AppConfig::load()?;
    logging::init_logging(&config.logging)?;

    Ok(config)
}
