use clap::Parser;
use resource_cache::cli::{self, Cli, Command};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::Resources => cli::resources::run().await,
        Command::Query(args) => cli::query::run(args).await,
        Command::Dump(args) => cli::dump::run(args).await,
    }
}
