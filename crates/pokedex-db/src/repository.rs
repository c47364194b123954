//! Pokemon repository for PostgreSQL.
//!
//! # Testing
//!
//! Unit tests cover the SQL text and the `ILIKE` pattern builder. Queries
//! against a live database are exercised through the server crate with a
//! running PostgreSQL and are not part of `cargo test`.

use async_trait::async_trait;
use pokedex_core::error::AppError;
use pokedex_core::models::{NewPokemon, Pokemon};
use pokedex_core::store::PokemonStore;
use sqlx::{PgPool, Pool, Postgres};
use tracing::{debug, info};

/// Column list for SELECT queries. Must remain a const literal to ensure SQL safety
/// since format!() bypasses sqlx compile-time validation.
const POKEMON_COLUMNS: &str = "id, name, image_url, types";

/// Idempotent schema. Runs at every startup; there is no migration versioning.
const SCHEMA_STATEMENTS: [&str; 2] = [
    r#"
    CREATE TABLE IF NOT EXISTS pokemon (
        id SERIAL PRIMARY KEY,
        name TEXT NOT NULL,
        image_url TEXT,
        types TEXT[] NOT NULL DEFAULT '{}'
    )
    "#,
    "CREATE INDEX IF NOT EXISTS ix_pokemon_name ON pokemon (name)",
];

/// Builds an `ILIKE` pattern matching `fragment` anywhere in the name.
///
/// `\`, `%` and `_` are escaped so the fragment is matched literally.
pub fn contains_pattern(fragment: &str) -> String {
    let mut pattern = String::with_capacity(fragment.len() + 2);
    pattern.push('%');
    for c in fragment.chars() {
        if matches!(c, '\\' | '%' | '_') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

/// Repository for pokemon persistence in PostgreSQL.
///
/// # Examples
///
/// ```no_run
/// use sqlx::postgres::PgPoolOptions;
/// use pokedex_db::PokemonRepository;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let pool = PgPoolOptions::new()
///     .max_connections(5)
///     .connect("postgresql://localhost/pokedex")
///     .await?;
///
/// let repo = PokemonRepository::new(pool);
/// repo.ensure_schema().await?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct PokemonRepository {
    pool: Pool<Postgres>,
}

impl PokemonRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Creates the `pokemon` table and its name index if absent.
    pub async fn ensure_schema(&self) -> Result<(), AppError> {
        for statement in SCHEMA_STATEMENTS {
            sqlx::query(statement)
                .execute(&self.pool)
                .await
                .map_err(AppError::StoreUnavailable)?;
        }
        info!("Pokemon table ready");
        Ok(())
    }

    /// Inserts all rows in one transaction. Returns the new ids in input order.
    ///
    /// If any insert or the commit fails, the transaction is rolled back when
    /// it is dropped, so no row of the batch becomes visible.
    pub async fn insert_batch(&self, batch: &[NewPokemon]) -> Result<Vec<i32>, AppError> {
        let mut tx = self.pool.begin().await.map_err(AppError::StoreUnavailable)?;
        let mut ids = Vec::with_capacity(batch.len());

        for new_pokemon in batch {
            let rec: (i32,) = sqlx::query_as(
                r#"
                INSERT INTO pokemon (name, image_url, types)
                VALUES ($1, $2, $3)
                RETURNING id
                "#,
            )
            .bind(&new_pokemon.name)
            .bind(&new_pokemon.image_url)
            .bind(&new_pokemon.types)
            .fetch_one(&mut *tx)
            .await
            .map_err(AppError::StoreUnavailable)?;

            ids.push(rec.0);
        }

        tx.commit().await.map_err(AppError::StoreUnavailable)?;
        debug!("Committed batch of {} pokemon", ids.len());

        Ok(ids)
    }

    /// Lists pokemon in insertion order, optionally filtered by a
    /// case-insensitive name fragment. An empty fragment means no filter.
    pub async fn list(&self, name_fragment: Option<&str>) -> Result<Vec<Pokemon>, AppError> {
        let rows = match name_fragment.filter(|f| !f.is_empty()) {
            Some(fragment) => {
                let query = format!(
                    "SELECT {} FROM pokemon WHERE name ILIKE $1 ESCAPE '\\' ORDER BY id",
                    POKEMON_COLUMNS
                );
                sqlx::query_as::<_, Pokemon>(&query)
                    .bind(contains_pattern(fragment))
                    .fetch_all(&self.pool)
                    .await
                    .map_err(AppError::StoreUnavailable)?
            }
            None => {
                let query = format!("SELECT {} FROM pokemon ORDER BY id", POKEMON_COLUMNS);
                sqlx::query_as::<_, Pokemon>(&query)
                    .fetch_all(&self.pool)
                    .await
                    .map_err(AppError::StoreUnavailable)?
            }
        };

        Ok(rows)
    }

    /// Returns the number of stored rows.
    pub async fn count(&self) -> Result<i64, AppError> {
        let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM pokemon")
            .fetch_one(&self.pool)
            .await
            .map_err(AppError::StoreUnavailable)?;

        Ok(row.0)
    }
}

#[async_trait]
impl PokemonStore for PokemonRepository {
    async fn insert_batch(&self, batch: &[NewPokemon]) -> Result<Vec<i32>, AppError> {
        PokemonRepository::insert_batch(self, batch).await
    }

    async fn list(&self, name_fragment: Option<&str>) -> Result<Vec<Pokemon>, AppError> {
        PokemonRepository::list(self, name_fragment).await
    }

    async fn count(&self) -> Result<i64, AppError> {
        PokemonRepository::count(self).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contains_pattern_wraps_fragment() {
        assert_eq!(contains_pattern("PIK"), "%PIK%");
    }

    #[test]
    fn test_contains_pattern_escapes_wildcards() {
        assert_eq!(contains_pattern("mr_mime"), "%mr\\_mime%");
        assert_eq!(contains_pattern("100%"), "%100\\%%");
        assert_eq!(contains_pattern("a\\b"), "%a\\\\b%");
    }

    #[test]
    fn test_contains_pattern_keeps_unicode() {
        assert_eq!(contains_pattern("flabébé"), "%flabébé%");
    }

    #[test]
    fn test_schema_is_idempotent() {
        assert!(SCHEMA_STATEMENTS
            .iter()
            .all(|s| s.contains("IF NOT EXISTS")));
    }

    #[test]
    fn test_schema_columns_match_select_list() {
        for column in POKEMON_COLUMNS.split(", ") {
            assert!(SCHEMA_STATEMENTS[0].contains(column), "missing {}", column);
        }
    }
}
