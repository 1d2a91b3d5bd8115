use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::cli::{Commands, Invocation};

mod cli;
mod config;
mod context;
mod registry;

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = cli::Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("relcat=debug,info")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("relcat=warn"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();

    let settings = config::Settings::from_cli(&cli)?;
    let ctx = context::Context::new(settings)?;
    let format = cli.format;

    // Verification works from the file name alone and needs no catalog.
    let command = match cli.command {
        Commands::Verify { file } => return cli::verify::run(&ctx, &file, format).await,
        command => command,
    };

    let catalog = ctx.load_catalog().await?;

    let invocation = match command {
        Commands::List => Invocation::List,
        Commands::Latest { product } => Invocation::Latest { product },
        Commands::Versions { product } => Invocation::Versions { product },
        Commands::Install(args) => Invocation::Install(args),
        Commands::Fetch(args) => Invocation::Fetch(args),
        Commands::Product(words) => registry::Registry::from_catalog(&catalog).dispatch(&words)?,
        Commands::Verify { file } => return cli::verify::run(&ctx, &file, format).await,
    };

    match invocation {
        Invocation::List => cli::query::list(&catalog, format),
        Invocation::Versions { product } => cli::query::versions(&catalog, &product, format),
        Invocation::Latest { product } => cli::query::latest(&catalog, &product, format),
        Invocation::Install(args) => cli::install::run(&ctx, &catalog, &args, false, format).await,
        Invocation::Fetch(args) => cli::install::run(&ctx, &catalog, &args, true, format).await,
    }
}
