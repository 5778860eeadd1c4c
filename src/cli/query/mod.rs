//! Query command - seeds the cache and runs a single read

use clap::Args;
use tracing::info;

use super::SeedArgs;
use crate::domain::cache::CacheFilter;
use crate::infrastructure::seed;

/// Arguments for the query command
#[derive(Args, Clone)]
pub struct QueryArgs {
    #[command(flatten)]
    pub seed: SeedArgs,

    /// Resource to read (plural or singular)
    #[arg(long)]
    pub resource: String,

    /// Object keys to fetch; all cached keys when omitted
    #[arg(long, value_delimiter = ',')]
    pub ids: Vec<String>,

    /// Attributes to project; all present attributes when omitted
    #[arg(long, value_delimiter = ',')]
    pub attrs: Vec<String>,
}

impl QueryArgs {
    fn filter(&self) -> CacheFilter {
        CacheFilter::new()
            .with_ids(self.ids.iter().cloned())
            .with_attrs(self.attrs.iter().cloned())
    }
}

/// Seed the cache, run the read and print the tagged lookup as JSON
pub async fn run(args: QueryArgs) -> anyhow::Result<()> {
    let config = super::bootstrap()?;
    let cache = crate::create_cache(&config)?;

    let entries = seed::read_seed(&args.seed.seed)?;
    let loaded = seed::load_seed(cache.as_ref(), &args.seed.category, entries).await?;
    info!(loaded, "Seed loaded");

    let lookup = cache
        .get(&args.seed.category, &args.resource, &args.filter())
        .await?;

    println!("{}", serde_json::to_string_pretty(&lookup)?);
    Ok(())
}
