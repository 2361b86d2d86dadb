mod catalog;
mod classifier;
mod cli;
mod error;
mod fmt;
mod importer;
mod models;
mod reports;
mod settings;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use cli::{CatalogCommands, Cli, Commands};

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing();

    let result = match cli.command {
        Commands::Init {
            results_dir,
            catalog,
        } => cli::init::run(results_dir, catalog),
        Commands::Taxable {
            file,
            catalog,
            output,
            filtered,
        } => cli::taxable::run(&file, catalog.as_deref(), output.as_deref(), filtered.as_deref()),
        Commands::Classify { file, catalog } => cli::classify::run(&file, catalog.as_deref()),
        Commands::Catalog { command } => match command {
            CatalogCommands::List { catalog } => cli::catalog::list(catalog.as_deref()),
            CatalogCommands::Add {
                key,
                category,
                catalog,
            } => cli::catalog::add(&key, &category, catalog.as_deref()),
            CatalogCommands::Remove {
                key,
                category,
                catalog,
            } => cli::catalog::remove(&key, &category, catalog.as_deref()),
            CatalogCommands::Init { force } => cli::catalog::init(force),
        },
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
