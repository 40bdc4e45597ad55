pub mod types;
pub mod config;
pub mod error;
pub mod data;
pub mod boundary;
pub mod resolver;
pub mod selection;
pub mod info;
pub mod geocoder;
pub mod search;
pub mod app;
pub mod server;

use clap::{Parser, Subcommand};
use info::InfoResult;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the map API and front-end
    Serve {
        #[arg(short, long, value_name = "FILE", default_value = "config.toml")]
        config: PathBuf,
        /// Geoapify API key (overrides the config file)
        #[arg(long, env = "GEOAPIFY_API_KEY", hide_env_values = true)]
        geoapify_key: Option<String>,
    },
    /// Find the state containing a coordinate
    Resolve {
        #[arg(short, long, value_name = "FILE", default_value = "config.toml")]
        config: PathBuf,
        #[arg(long, allow_hyphen_values = true)]
        lat: f64,
        #[arg(long, allow_hyphen_values = true)]
        lon: f64,
    },
    /// Show assembly information for a state
    Info {
        #[arg(short, long, value_name = "FILE", default_value = "config.toml")]
        config: PathBuf,
        name: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Serve { config, geoapify_key } => {
            let app_config = config::AppConfig::load_from_file(&config)?;

            let datasets = data::load_datasets(&app_config).await;
            let geocoder = geocoder::GeoapifyClient::new(&app_config.geocoder, geoapify_key)?;

            server::start_server(app_config, datasets, geocoder).await?;
        }
        Commands::Resolve { config, lat, lon } => {
            let app_config = config::AppConfig::load_from_file(&config)?;
            let datasets = data::load_datasets(&app_config).await;

            match resolver::resolve(&datasets.boundaries, lat, lon) {
                Some(region) => print_info(&datasets.info.info_for(&region.name)),
                None => println!("{}", app::LOCATION_NOT_FOUND),
            }
        }
        Commands::Info { config, name } => {
            let app_config = config::AppConfig::load_from_file(&config)?;
            let datasets = data::load_datasets(&app_config).await;

            print_info(&datasets.info.info_for(&name));
        }
    }

    Ok(())
}

fn print_info(info: &InfoResult) {
    println!("{}", info.region());

    if let Some(explanation) = info.explanation() {
        println!("\n{}\n", explanation);
    }

    if info.member_count() > 0 {
        println!("Number of Members in Constituent Assembly: {}", info.member_count());
    }

    if let Some(notice) = info.notice() {
        println!("{}", notice);
    }

    for delegate in info.delegates() {
        match &delegate.url {
            Some(url) => println!("  - {} ({}) {}", delegate.name, delegate.province, url),
            None => println!("  - {} ({})", delegate.name, delegate.province),
        }
    }
}
