//! Startup sequencing shared by the binary and the end-to-end tests.

use std::sync::Arc;

use pokedex_core::{run_startup_pass, CatalogSource, IngestConfig, PassReport, PokemonStore};
use tokio::net::TcpListener;
use tracing::{info, warn};

use crate::api;

/// Runs the startup pass, then serves queries on `listener`.
///
/// A failed pass is logged and the endpoint still comes up, serving whatever
/// the store already holds.
pub async fn ingest_then_serve(
    source: &dyn CatalogSource,
    store: Arc<dyn PokemonStore>,
    ingest: &IngestConfig,
    listener: TcpListener,
) -> anyhow::Result<()> {
    log_pass(run_startup_pass(source, store.as_ref(), ingest).await);
    api::serve(listener, store).await
}

fn log_pass(report: Option<PassReport>) {
    match report {
        Some(report) => info!(
            "Startup ingestion complete: {} listed, {} stored",
            report.listed, report.stored
        ),
        None => warn!("Startup ingestion failed; serving existing data only"),
    }
}
