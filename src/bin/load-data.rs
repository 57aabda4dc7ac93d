use std::path::PathBuf;

use album_catalog::{
    artists::ArtistRepository,
    config::Config,
    model::Artist,
    store::DynamoStore,
    utils::{setup_sdk_config, setup_tracing},
};
use aws_sdk_dynamodb::Client;
use clap::Parser;
use tracing::{info, warn};

type E = Box<dyn std::error::Error + Sync + Send + 'static>;

/// Seeds the artists table from a JSON array of artist records
#[derive(Parser, Debug)]
#[command(name = "load-data")]
#[command(version, about, long_about = None)]
struct Cli {
    /// JSON file holding an array of artists
    file: PathBuf,
}

#[tokio::main]
async fn main() -> Result<(), E> {
    let cli = Cli::parse();
    setup_tracing();

    let config = Config::from_env()?;
    let sdk_config = setup_sdk_config(&config).await;
    let repo = ArtistRepository::new(DynamoStore::new(
        Client::new(&sdk_config),
        config.table_name.clone(),
    ));

    let contents = tokio::fs::read_to_string(&cli.file).await?;
    let artists: Vec<Artist> = serde_json::from_str(&contents)?;
    info!("loading {} artists into {}", artists.len(), config.table_name);

    for artist in artists {
        let id = artist.id.clone();
        match repo.put(Some(&id), artist).await? {
            Some(stored) => info!("stored artist {} ({})", stored.id, stored.name),
            None => warn!("artist {} was not readable after put", id),
        }
    }

    Ok(())
}
