use clap::{Parser, Subcommand};
use pokedex_core::config::{
    DbConfig, HttpConfig, IngestConfig, DEFAULT_PAGE_LIMIT, DEFAULT_POKEAPI_BASE_URL,
};
use std::time::Duration;

/// CLI configuration parsed from command line arguments and environment variables
#[derive(Parser, Debug)]
#[command(name = "pokedex")]
#[command(
    author,
    version,
    about = "Ingests a page of PokeAPI creatures and serves them over HTTP"
)]
#[command(after_help = "Examples:
  pokedex                        # ingest once, then serve on 127.0.0.1:8080
  pokedex --limit 20 serve
  pokedex ingest --concurrency 4
  pokedex stats")]
pub struct Config {
    /// PostgreSQL database connection URL
    #[arg(long, env = "DATABASE_URL")]
    pub database_url: String,

    /// Base address of the PokeAPI catalog
    #[arg(long, env = "POKEAPI_BASE_URL", default_value = DEFAULT_POKEAPI_BASE_URL)]
    pub pokeapi_base_url: String,

    /// Address the query endpoint listens on
    #[arg(long, env = "POKEDEX_BIND", default_value = "127.0.0.1:8080")]
    pub bind: String,

    /// Number of catalog entries ingested per pass
    #[arg(long, env = "POKEDEX_LIMIT", default_value_t = DEFAULT_PAGE_LIMIT)]
    pub limit: u32,

    /// Maximum number of detail requests in flight during a pass
    #[arg(long, env = "POKEDEX_CONCURRENCY", default_value_t = 1)]
    pub concurrency: usize,

    /// Maximum size of the database connection pool
    #[arg(long, env = "DB_MAX_CONNECTIONS", default_value_t = DbConfig::default().max_connections)]
    pub db_max_connections: u32,

    /// Timeout in seconds for each catalog request
    #[arg(long, env = "HTTP_TIMEOUT", default_value_t = 30)]
    pub http_timeout_secs: u64,

    #[command(subcommand)]
    pub command: Option<Command>,
}

impl Config {
    pub fn resolved_command(&self) -> Command {
        self.command.clone().unwrap_or_default()
    }

    pub fn ingest_config(&self) -> IngestConfig {
        IngestConfig {
            limit: self.limit,
            concurrency: self.concurrency,
        }
    }

    pub fn http_config(&self) -> HttpConfig {
        HttpConfig {
            timeout: Duration::from_secs(self.http_timeout_secs),
            ..HttpConfig::default()
        }
    }

    pub fn db_config(&self) -> DbConfig {
        DbConfig {
            max_connections: self.db_max_connections,
        }
    }
}

/// Available CLI commands
#[derive(Subcommand, Debug, Clone, Default, PartialEq, Eq)]
pub enum Command {
    /// Create the table, run one ingestion pass, then serve queries (default)
    #[default]
    Serve,
    /// Create the table and run one ingestion pass, then exit
    Ingest,
    /// Show the number of stored pokemon
    Stats,
}
