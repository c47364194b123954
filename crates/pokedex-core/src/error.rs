use thiserror::Error;

/// Application-wide error types.
///
/// Every fallible operation in the Pokedex crates returns this enum. The
/// ingestion pass aborts on the first error it sees; the query endpoint maps
/// any error to an opaque response.
///
/// # Error Conversion
///
/// - `sqlx::Error` → `AppError::StoreUnavailable`
///
/// # Examples
///
/// ```no_run
/// use pokedex_core::error::AppError;
///
/// fn example() -> Result<(), AppError> {
///     Err(AppError::UpstreamUnavailable("HTTP 503 from catalog".to_string()))
/// }
/// ```
#[derive(Error, Debug)]
pub enum AppError {
    /// The catalog API could not be reached or answered with a non-2xx status.
    ///
    /// Also raised when a successful response body cannot be decoded into the
    /// expected listing or detail shape.
    #[error("Upstream catalog unavailable: {0}")]
    UpstreamUnavailable(String),

    /// Opening, querying or committing against the record store failed.
    ///
    /// Wraps all errors from SQLx, including connection failures, pool
    /// timeouts and aborted transactions.
    #[error("Store unavailable: {0}")]
    StoreUnavailable(#[from] sqlx::Error),

    /// A configured base URL could not be parsed.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// An upstream record violates an entity invariant (e.g. an empty name).
    #[error("Invalid record: {0}")]
    InvalidRecord(String),

    /// Generic application error for cases not covered by specific variants.
    #[error("Error: {0}")]
    Generic(String),
}

impl AppError {
    /// Returns a user-friendly error message suitable for CLI output.
    pub fn user_message(&self) -> String {
        match self {
            AppError::StoreUnavailable(e) => {
                if e.to_string().contains("connection") {
                    "Cannot connect to database. Is PostgreSQL running?\n   Check DATABASE_URL."
                        .to_string()
                } else {
                    format!("Database error: {}", e)
                }
            }
            AppError::UpstreamUnavailable(msg) => {
                if msg.contains("timed out") {
                    "The catalog API timed out.\n   Try again later or check POKEAPI_BASE_URL."
                        .to_string()
                } else {
                    format!(
                        "Catalog API error: {}\n   Check your internet connection and POKEAPI_BASE_URL.",
                        msg
                    )
                }
            }
            AppError::InvalidUrl(url) => {
                format!(
                    "Invalid URL: {}\n   Example: https://pokeapi.co/api/v2/",
                    url
                )
            }
            _ => self.to_string(),
        }
    }

    /// Returns true if the error came from the catalog API.
    pub fn is_upstream(&self) -> bool {
        matches!(self, AppError::UpstreamUnavailable(_))
    }
}
