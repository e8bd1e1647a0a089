//! Tchitchen CLI — recipe scaling and prep lists for a kitchen brigade.

use clap::Parser;
use std::path::PathBuf;
use tchitchen::core::config::Config;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "tchitchen",
    version,
    about = "Kitchen brigade yield engine — scale recipes, aggregate prep lists, run the task board"
)]
struct Cli {
    /// Config file
    #[arg(long, global = true, default_value = "tchitchen.toml")]
    config: PathBuf,

    /// Kitchen file (overrides config and TCHITCHEN_KITCHEN)
    #[arg(long, global = true)]
    kitchen: Option<PathBuf>,

    #[command(subcommand)]
    command: tchitchen::cli::Commands,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let result = Config::load(&cli.config).and_then(|mut config| {
        if let Some(kitchen) = cli.kitchen {
            config.kitchen = kitchen;
        }
        tchitchen::cli::dispatch(cli.command, &config)
    });
    if let Err(e) = result {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}
