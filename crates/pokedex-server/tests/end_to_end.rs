//! End-to-end: a local fake catalog, the real HTTP client, the in-memory
//! store, and the query endpoint.

use std::sync::Arc;

use axum::extract::Path;
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use pokedex_client::PokeApiClient;
use pokedex_core::{run_pass, InMemoryStore, IngestConfig, PokemonStore};
use pokedex_server::api::POKEMONS_PATH;
use pokedex_server::app::ingest_then_serve;
use serde_json::{json, Value};
use tokio::net::TcpListener;

async fn spawn_router(router: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{}", addr)
}

/// Catalog listing bulbasaur and ivysaur, with working detail resources.
fn healthy_catalog() -> Router {
    Router::new()
        .route(
            "/api/v2/pokemon",
            get(|| async {
                Json(json!({
                    "count": 2,
                    "results": [
                        {"name": "bulbasaur", "url": "pokemon/1/"},
                        {"name": "ivysaur", "url": "pokemon/2/"}
                    ]
                }))
            }),
        )
        .route(
            "/api/v2/pokemon/{id}/",
            get(|Path(id): Path<u32>| async move {
                Json(json!({
                    "types": [
                        {"slot": 1, "type": {"name": "grass"}},
                        {"slot": 2, "type": {"name": "poison"}}
                    ],
                    "sprites": {"front_default": format!("https://img.test/{}.png", id)}
                }))
            }),
        )
}

fn broken_catalog() -> Router {
    Router::new().route(
        "/api/v2/pokemon",
        get(|| async { StatusCode::INTERNAL_SERVER_ERROR }),
    )
}

async fn start_service(catalog: Router, store: Arc<InMemoryStore>) -> String {
    let catalog_base = spawn_router(catalog).await;
    let client = PokeApiClient::new(&format!("{}/api/v2/", catalog_base)).unwrap();

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        ingest_then_serve(&client, store, &IngestConfig::default(), listener)
            .await
            .unwrap();
    });

    format!("http://{}{}", addr, POKEMONS_PATH)
}

/// Polls until the endpoint answers; the pass runs before the listener accepts.
async fn query(url: &str) -> Value {
    let mut last_err = None;
    for _ in 0..50 {
        match reqwest::get(url).await {
            Ok(resp) => return resp.json().await.unwrap(),
            Err(e) => last_err = Some(e),
        }
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
    }
    panic!("service never answered: {:?}", last_err);
}

#[tokio::test]
async fn test_startup_pass_then_query() {
    let store = Arc::new(InMemoryStore::new());
    let url = start_service(healthy_catalog(), store.clone()).await;

    let all = query(&url).await;
    let all = all.as_array().unwrap();
    assert_eq!(all.len(), 2);
    assert_eq!(all[0]["name"], "bulbasaur");
    assert_eq!(all[0]["types"], json!(["grass", "poison"]));
    assert_eq!(all[1]["image_url"], "https://img.test/2.png");

    let filtered = query(&format!("{}?name=bulba", url)).await;
    let filtered = filtered.as_array().unwrap();
    assert_eq!(filtered.len(), 1);
    assert_eq!(filtered[0]["name"], "bulbasaur");
}

#[tokio::test]
async fn test_failed_listing_still_serves_empty_store() {
    let store = Arc::new(InMemoryStore::new());
    let url = start_service(broken_catalog(), store.clone()).await;

    let all = query(&url).await;

    assert_eq!(all, json!([]));
    assert_eq!(store.count().await.unwrap(), 0);
}

#[tokio::test]
async fn test_failed_listing_reports_upstream_error() {
    let catalog_base = spawn_router(broken_catalog()).await;
    let client = PokeApiClient::new(&format!("{}/api/v2/", catalog_base)).unwrap();
    let store = InMemoryStore::new();

    let err = run_pass(&client, &store, &IngestConfig::default())
        .await
        .unwrap_err();

    assert!(err.is_upstream());
    assert_eq!(store.count().await.unwrap(), 0);
}

#[tokio::test]
async fn test_second_pass_appends_duplicates() {
    let catalog_base = spawn_router(healthy_catalog()).await;
    let client = PokeApiClient::new(&format!("{}/api/v2/", catalog_base)).unwrap();
    let store = InMemoryStore::new();
    let config = IngestConfig {
        limit: 200,
        concurrency: 2,
    };

    let first = run_pass(&client, &store, &config).await.unwrap();
    let second = run_pass(&client, &store, &config).await.unwrap();

    assert_eq!(
        store.count().await.unwrap(),
        (first.stored + second.stored) as i64
    );
    assert_eq!(store.list(Some("IVY")).await.unwrap().len(), 2);
}
