//! Pokedex Server - startup ingestion and the HTTP query endpoint
//!
//! This crate ties the catalog client, the Postgres repository and the
//! ingestion pass together behind the `pokedex` binary.

pub mod api;
pub mod app;
pub mod config;

pub use config::{Command, Config};
