//! papershelf - a personal library of astronomy papers
//!
//! Papers are stored by ADS bibcode in a local SQLite database, with
//! metadata fetched from NASA ADS.

mod cli;
mod commands;

use clap::Parser;
use papershelf_core::{Library, LibraryConfig};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cli::Cli;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let config_path = cli.config.clone().unwrap_or_else(LibraryConfig::default_path);
    let mut config = LibraryConfig::load(&config_path)?;
    if let Some(database) = cli.database {
        config.database = database;
    }

    let gateway = commands::build_gateway(&config);
    let library = Library::open(&config.database, gateway, &config)?;
    commands::run(cli.command, &library, &config)
}
