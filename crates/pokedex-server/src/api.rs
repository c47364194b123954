//! HTTP query surface.
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET`  | `/api/v1/pokemons` | List stored pokemon, optional `?name=` filter |
//! | `GET`  | `/health` | Health check (returns version) |
//!
//! Undecodable query strings (400) and store failures (500) are logged and
//! answered with the same opaque `{"error": "..."}` body; internal error text
//! never reaches the caller.

use axum::{
    extract::{rejection::QueryRejection, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use pokedex_core::{AppError, Pokemon, PokemonStore};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{error, info, warn};

/// Path of the entity collection.
pub const POKEMONS_PATH: &str = "/api/v1/pokemons";

/// Message returned for every failed query, whatever the cause.
pub const QUERY_ERROR_MESSAGE: &str = "An error occurred while fetching pokemons";

/// Shared state for route handlers. Each request borrows its own connection
/// through the store; nothing mutable is shared between requests.
#[derive(Clone)]
struct AppState {
    store: Arc<dyn PokemonStore>,
}

/// Builds the router over any [`PokemonStore`].
pub fn router(store: Arc<dyn PokemonStore>) -> Router {
    Router::new()
        .route(POKEMONS_PATH, get(handle_list_pokemons))
        .route("/health", get(handle_health))
        .with_state(AppState { store })
}

/// Serves the router on an already bound listener until the process ends.
pub async fn serve(listener: TcpListener, store: Arc<dyn PokemonStore>) -> anyhow::Result<()> {
    if let Ok(addr) = listener.local_addr() {
        info!("Listening on http://{}{}", addr, POKEMONS_PATH);
    }
    axum::serve(listener, router(store)).await?;
    Ok(())
}

// ============ Error response ============

#[derive(Serialize)]
struct ErrorBody {
    error: &'static str,
}

/// Opaque query failure. The cause is only logged.
enum QueryError {
    /// The query string could not be decoded (e.g. `name` given twice).
    BadQuery(QueryRejection),
    Store(AppError),
}

impl From<AppError> for QueryError {
    fn from(err: AppError) -> Self {
        Self::Store(err)
    }
}

impl From<QueryRejection> for QueryError {
    fn from(rejection: QueryRejection) -> Self {
        Self::BadQuery(rejection)
    }
}

impl IntoResponse for QueryError {
    fn into_response(self) -> Response {
        let status = match self {
            QueryError::BadQuery(rejection) => {
                warn!("Rejected query string: {}", rejection.body_text());
                StatusCode::BAD_REQUEST
            }
            QueryError::Store(err) => {
                error!("An error occurred: {}", err);
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        let body = ErrorBody {
            error: QUERY_ERROR_MESSAGE,
        };
        (status, Json(body)).into_response()
    }
}

// ============ GET /api/v1/pokemons ============

#[derive(Debug, Deserialize)]
struct PokemonQuery {
    name: Option<String>,
}

/// Lists every stored pokemon, or those whose name contains `name`
/// (case-insensitive). No match is an empty array, not an error.
async fn handle_list_pokemons(
    State(state): State<AppState>,
    query: Result<Query<PokemonQuery>, QueryRejection>,
) -> Result<Json<Vec<Pokemon>>, QueryError> {
    let Query(query) = query?;
    let pokemons = state.store.list(query.name.as_deref()).await?;
    Ok(Json(pokemons))
}

// ============ GET /health ============

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

async fn handle_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}
