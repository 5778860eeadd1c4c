//! Resources command - prints the supported-resource binding

use crate::domain::cache::CollectionKey;

/// Print every resource type the configured cache supports
pub async fn run() -> anyhow::Result<()> {
    let config = super::bootstrap()?;
    let cache = crate::create_cache(&config)?;

    println!("cache: {}", cache.name());

    if cache.supported_resources().is_empty() {
        println!("(no cacheable resources configured)");
        return Ok(());
    }

    for (plural, class_name) in cache.supported_resources().iter() {
        println!(
            "{:<32} {:<24} {}",
            plural,
            class_name,
            CollectionKey::for_plural(plural)
        );
    }

    Ok(())
}
