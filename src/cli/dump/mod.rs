//! Dump command - seeds the cache and prints its diagnostic listing

use tracing::info;

use super::SeedArgs;
use crate::infrastructure::seed;

/// Load the seed file and print every collection
pub async fn run(args: SeedArgs) -> anyhow::Result<()> {
    let config = super::bootstrap()?;
    let cache = crate::create_cache(&config)?;

    let entries = seed::read_seed(&args.seed)?;
    let loaded = seed::load_seed(cache.as_ref(), &args.category, entries).await?;
    info!(loaded, seed = %args.seed.display(), "Seed loaded");

    print!("{}", cache);
    Ok(())
}
