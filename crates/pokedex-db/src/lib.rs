//! Pokedex DB - PostgreSQL repository for stored pokemon.

pub mod repository;

pub use repository::PokemonRepository;
