//! Pokedex Client - HTTP client for the external creature catalog
//!
//! - [`pokeapi`] - PokeAPI listing and detail resources
//!
//! The client implements [`pokedex_core::CatalogSource`], so the ingestion
//! pass can run against it or against any other source.

pub mod pokeapi;

pub use pokeapi::PokeApiClient;
