//! Configuration defaults for Pokedex components.
//!
//! The binary overrides these from CLI flags and environment variables; the
//! library crates only ever see the resolved structs.

use std::time::Duration;

/// Default PokeAPI base address. Must end with a slash so relative joins keep `/api/v2/`.
pub const DEFAULT_POKEAPI_BASE_URL: &str = "https://pokeapi.co/api/v2/";

/// Default number of listing entries requested in a pass.
pub const DEFAULT_PAGE_LIMIT: u32 = 200;

/// Database connection pool configuration.
#[derive(Debug, Clone)]
pub struct DbConfig {
    pub max_connections: u32,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self { max_connections: 5 }
    }
}

/// HTTP client configuration for catalog calls.
#[derive(Debug, Clone)]
pub struct HttpConfig {
    pub timeout: Duration,
    pub user_agent: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            user_agent: "Pokedex/0.1 (ingestion-bot)".to_string(),
        }
    }
}

/// Ingestion pass configuration.
///
/// `concurrency` bounds the number of detail requests in flight. The default
/// of 1 fetches details strictly one at a time, in listing order.
#[derive(Debug, Clone)]
pub struct IngestConfig {
    pub limit: u32,
    pub concurrency: usize,
}

impl IngestConfig {
    /// Concurrency clamped to at least one in-flight request.
    pub fn effective_concurrency(&self) -> usize {
        self.concurrency.max(1)
    }
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            limit: DEFAULT_PAGE_LIMIT,
            concurrency: 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_db_config_defaults() {
        let config = DbConfig::default();
        assert_eq!(config.max_connections, 5);
    }

    #[test]
    fn test_http_config_defaults() {
        let config = HttpConfig::default();
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert!(config.user_agent.starts_with("Pokedex/"));
    }

    #[test]
    fn test_ingest_config_defaults() {
        let config = IngestConfig::default();
        assert_eq!(config.limit, 200);
        assert_eq!(config.concurrency, 1);
    }

    #[test]
    fn test_effective_concurrency_never_zero() {
        let config = IngestConfig {
            limit: 10,
            concurrency: 0,
        };
        assert_eq!(config.effective_concurrency(), 1);
    }

    #[test]
    fn test_default_base_url_has_trailing_slash() {
        assert!(DEFAULT_POKEAPI_BASE_URL.ends_with('/'));
    }
}
