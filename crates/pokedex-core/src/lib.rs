//! Pokedex Core - Domain types, error handling, configuration and the ingestion pass.

pub mod config;
pub mod error;
pub mod ingest;
pub mod models;
pub mod store;

pub use config::{DbConfig, HttpConfig, IngestConfig};
pub use error::AppError;
pub use ingest::{run_pass, run_startup_pass, PassReport};
pub use models::{CatalogEntry, NewPokemon, Pokemon, PokemonDetail};
pub use store::{CatalogSource, InMemoryStore, PokemonStore};
