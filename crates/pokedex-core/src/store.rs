//! Storage and catalog seams for the ingestion pass and query endpoint.
//!
//! [`CatalogSource`] is implemented by the HTTP client, [`PokemonStore`] by
//! the Postgres repository. [`InMemoryStore`] backs tests and local runs
//! without a database.

use std::sync::RwLock;

use async_trait::async_trait;

use crate::error::AppError;
use crate::models::{CatalogEntry, NewPokemon, Pokemon, PokemonDetail};

/// Read access to the external creature catalog.
#[async_trait]
pub trait CatalogSource: Send + Sync {
    /// Lists at most `limit` entries, in upstream order.
    async fn list_page(&self, limit: u32) -> Result<Vec<CatalogEntry>, AppError>;

    /// Resolves one detail reference taken from a listing entry.
    async fn fetch_detail(&self, detail_url: &str) -> Result<PokemonDetail, AppError>;
}

/// Persistence for creature records.
#[async_trait]
pub trait PokemonStore: Send + Sync {
    /// Persists all entities atomically and returns their assigned ids, in input order.
    ///
    /// On error nothing from `batch` is visible to readers.
    async fn insert_batch(&self, batch: &[NewPokemon]) -> Result<Vec<i32>, AppError>;

    /// Lists stored entities, optionally keeping only names containing
    /// `name_fragment` case-insensitively.
    async fn list(&self, name_fragment: Option<&str>) -> Result<Vec<Pokemon>, AppError>;

    /// Number of stored entities.
    async fn count(&self) -> Result<i64, AppError>;
}

/// Case-insensitive substring match used by stores that filter in process.
pub fn name_matches(name: &str, fragment: &str) -> bool {
    name.to_lowercase().contains(&fragment.to_lowercase())
}

/// In-memory [`PokemonStore`] with sequential ids starting at 1.
#[derive(Default)]
pub struct InMemoryStore {
    rows: RwLock<Vec<Pokemon>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn poisoned<T>(_: T) -> AppError {
    AppError::Generic("in-memory store lock poisoned".to_string())
}

#[async_trait]
impl PokemonStore for InMemoryStore {
    async fn insert_batch(&self, batch: &[NewPokemon]) -> Result<Vec<i32>, AppError> {
        let mut rows = self.rows.write().map_err(poisoned)?;
        let mut next_id = rows.last().map(|p| p.id).unwrap_or(0);

        // Build the whole batch before touching `rows` so readers never see a prefix.
        let mut staged = Vec::with_capacity(batch.len());
        for new in batch {
            next_id += 1;
            staged.push(new.clone().into_stored(next_id));
        }

        let ids = staged.iter().map(|p| p.id).collect();
        rows.extend(staged);
        Ok(ids)
    }

    async fn list(&self, name_fragment: Option<&str>) -> Result<Vec<Pokemon>, AppError> {
        let rows = self.rows.read().map_err(poisoned)?;
        let result = match name_fragment.filter(|f| !f.is_empty()) {
            Some(fragment) => rows
                .iter()
                .filter(|p| name_matches(&p.name, fragment))
                .cloned()
                .collect(),
            None => rows.clone(),
        };
        Ok(result)
    }

    async fn count(&self) -> Result<i64, AppError> {
        let rows = self.rows.read().map_err(poisoned)?;
        Ok(rows.len() as i64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_pokemon(name: &str) -> NewPokemon {
        NewPokemon {
            name: name.to_string(),
            image_url: None,
            types: vec!["normal".to_string()],
        }
    }

    #[test]
    fn test_name_matches_case_insensitive() {
        assert!(name_matches("pikachu", "PIK"));
        assert!(name_matches("Pikachu", "chu"));
        assert!(!name_matches("raichu", "pika"));
    }

    #[tokio::test]
    async fn test_insert_batch_assigns_sequential_ids() {
        let store = InMemoryStore::new();
        let ids = store
            .insert_batch(&[new_pokemon("bulbasaur"), new_pokemon("ivysaur")])
            .await
            .unwrap();
        assert_eq!(ids, vec![1, 2]);

        let ids = store.insert_batch(&[new_pokemon("venusaur")]).await.unwrap();
        assert_eq!(ids, vec![3]);
        assert_eq!(store.count().await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_list_filter_and_unfiltered() {
        let store = InMemoryStore::new();
        store
            .insert_batch(&[
                new_pokemon("pikachu"),
                new_pokemon("raichu"),
                new_pokemon("bulbasaur"),
            ])
            .await
            .unwrap();

        let all = store.list(None).await.unwrap();
        assert_eq!(all.len(), 3);

        let filtered = store.list(Some("CHU")).await.unwrap();
        let names: Vec<_> = filtered.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["pikachu", "raichu"]);
        assert!(filtered.iter().all(|p| all.contains(p)));
    }

    #[tokio::test]
    async fn test_empty_fragment_lists_everything() {
        let store = InMemoryStore::new();
        store.insert_batch(&[new_pokemon("eevee")]).await.unwrap();
        assert_eq!(store.list(Some("")).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_list_no_match_is_empty() {
        let store = InMemoryStore::new();
        store.insert_batch(&[new_pokemon("eevee")]).await.unwrap();
        assert!(store.list(Some("mew")).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_empty_batch_is_noop() {
        let store = InMemoryStore::new();
        let ids = store.insert_batch(&[]).await.unwrap();
        assert!(ids.is_empty());
        assert_eq!(store.count().await.unwrap(), 0);
    }
}
