use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use dotenvy::dotenv;
use sqlx::postgres::PgPoolOptions;
use tokio::net::TcpListener;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use pokedex_client::PokeApiClient;
use pokedex_core::{run_pass, IngestConfig};
use pokedex_db::PokemonRepository;
use pokedex_server::app::ingest_then_serve;
use pokedex_server::{Command, Config};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenv().ok();

    // Setup logging (stderr to keep stdout clean for stats output)
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("setting default subscriber failed")?;

    let config = Config::parse();

    // Database connection
    info!("Connecting to database...");
    let pool = PgPoolOptions::new()
        .max_connections(config.db_config().max_connections)
        .connect(&config.database_url)
        .await
        .context("Failed to connect to database")?;

    let repo = PokemonRepository::new(pool);
    repo.ensure_schema()
        .await
        .context("Failed to create pokemon table")?;

    match config.resolved_command() {
        Command::Serve => {
            let client = catalog_client(&config)?;
            let listener = TcpListener::bind(&config.bind)
                .await
                .with_context(|| format!("Failed to bind {}", config.bind))?;
            ingest_then_serve(&client, Arc::new(repo), &config.ingest_config(), listener).await?;
        }
        Command::Ingest => {
            let client = catalog_client(&config)?;
            ingest(&client, &repo, &config.ingest_config()).await?;
        }
        Command::Stats => {
            show_stats(&repo).await?;
        }
    }

    Ok(())
}

fn catalog_client(config: &Config) -> anyhow::Result<PokeApiClient> {
    PokeApiClient::with_config(&config.pokeapi_base_url, &config.http_config())
        .context("Invalid PokeAPI base URL")
}

/// Run a single pass and exit; unlike `serve`, a failed pass is an error exit.
async fn ingest(
    client: &PokeApiClient,
    repo: &PokemonRepository,
    ingest_config: &IngestConfig,
) -> anyhow::Result<()> {
    info!("Starting ingestion from: {}", client.base_url());

    let report = run_pass(client, repo, ingest_config)
        .await
        .map_err(|e| anyhow::anyhow!(e.user_message()))?;

    info!(
        "Ingestion complete: {} listed, {} stored",
        report.listed, report.stored
    );
    Ok(())
}

/// Show database statistics
async fn show_stats(repo: &PokemonRepository) -> anyhow::Result<()> {
    let total = repo.count().await?;

    println!("\nPokedex Statistics\n");
    println!("  Stored pokemon:        {}", total);
    println!();

    Ok(())
}
