use async_trait::async_trait;
use pokedex_core::config::HttpConfig;
use pokedex_core::error::AppError;
use pokedex_core::models::{CatalogEntry, PokemonDetail};
use pokedex_core::store::CatalogSource;
use reqwest::{Client, Url};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::debug;

/// Response of the PokeAPI `pokemon` listing endpoint.
///
/// PokeAPI reference: <https://pokeapi.co/docs/v2#resource-listspagination-section>
///
/// Only `results` is kept; `count`, `next` and `previous` are ignored since
/// a pass never pages past the first response.
#[derive(Deserialize, Debug)]
struct ListingResponse {
    results: Vec<CatalogEntry>,
}

/// Data Transfer Object for a PokeAPI `pokemon/{id}` detail record.
///
/// # Examples
///
/// ```
/// use pokedex_client::pokeapi::PokemonDto;
///
/// let json = r#"{
///     "types": [{"slot": 1, "type": {"name": "electric", "url": "x"}}],
///     "sprites": {"front_default": "https://img/25.png"},
///     "height": 4
/// }"#;
///
/// let dto: PokemonDto = serde_json::from_str(json).unwrap();
/// let detail = dto.into_detail();
/// assert_eq!(detail.types, vec!["electric"]);
/// assert_eq!(detail.image_url.as_deref(), Some("https://img/25.png"));
/// ```
#[derive(Deserialize, Debug, Clone)]
pub struct PokemonDto {
    #[serde(default)]
    pub types: Vec<TypeSlot>,
    #[serde(default)]
    pub sprites: Sprites,
}

#[derive(Deserialize, Debug, Clone)]
pub struct TypeSlot {
    #[serde(rename = "type")]
    pub kind: NamedResource,
}

#[derive(Deserialize, Debug, Clone)]
pub struct NamedResource {
    pub name: String,
}

#[derive(Deserialize, Debug, Clone, Default)]
pub struct Sprites {
    pub front_default: Option<String>,
}

impl PokemonDto {
    /// Keeps the type names (in upstream slot order) and the default front sprite.
    pub fn into_detail(self) -> PokemonDetail {
        PokemonDetail {
            image_url: self.sprites.front_default,
            types: self.types.into_iter().map(|slot| slot.kind.name).collect(),
        }
    }
}

/// HTTP client for the PokeAPI creature catalog.
///
/// Requests are sent one at a time by the caller's choice; the client itself
/// never retries.
///
/// # Examples
///
/// ```no_run
/// use pokedex_client::PokeApiClient;
/// use pokedex_core::CatalogSource;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = PokeApiClient::new("https://pokeapi.co/api/v2/")?;
/// let entries = client.list_page(20).await?;
/// println!("Found {} pokemon", entries.len());
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct PokeApiClient {
    client: Client,
    base_url: Url,
}

impl PokeApiClient {
    /// Creates a client with the default [`HttpConfig`].
    ///
    /// # Errors
    ///
    /// Returns `AppError::InvalidUrl` if the URL is invalid or malformed.
    /// Returns `AppError::Generic` if the HTTP client cannot be built.
    pub fn new(base_url_str: &str) -> Result<Self, AppError> {
        Self::with_config(base_url_str, &HttpConfig::default())
    }

    /// Creates a client for the catalog at `base_url_str`.
    ///
    /// A missing trailing slash is added so that relative joins keep the
    /// version prefix (`/api/v2` + `pokemon` → `/api/v2/pokemon`).
    pub fn with_config(base_url_str: &str, config: &HttpConfig) -> Result<Self, AppError> {
        let normalised = if base_url_str.ends_with('/') {
            base_url_str.to_string()
        } else {
            format!("{}/", base_url_str)
        };
        let base_url = Url::parse(&normalised)
            .map_err(|_| AppError::InvalidUrl(format!("Invalid catalog URL: {}", base_url_str)))?;

        let client = Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(config.timeout)
            .build()
            .map_err(|e| AppError::Generic(e.to_string()))?;

        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Builds the listing URL for one page of `limit` entries.
    fn listing_url(&self, limit: u32) -> Result<Url, AppError> {
        let mut url = self
            .base_url
            .join("pokemon")
            .map_err(|e| AppError::InvalidUrl(e.to_string()))?;
        url.query_pairs_mut()
            .append_pair("limit", &limit.to_string());
        Ok(url)
    }

    /// GETs `url` and decodes a JSON body.
    ///
    /// Transport errors, non-2xx statuses and undecodable bodies all surface
    /// as `AppError::UpstreamUnavailable`.
    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, AppError> {
        debug!("GET {}", url);
        let resp = self.client.get(url.clone()).send().await.map_err(|e| {
            if e.is_timeout() {
                AppError::UpstreamUnavailable(format!("request to {} timed out", url))
            } else {
                AppError::UpstreamUnavailable(format!("request to {} failed: {}", url, e))
            }
        })?;

        let status = resp.status();
        if !status.is_success() {
            return Err(AppError::UpstreamUnavailable(format!(
                "HTTP {} from {}",
                status.as_u16(),
                url
            )));
        }

        resp.json::<T>().await.map_err(|e| {
            AppError::UpstreamUnavailable(format!("invalid response body from {}: {}", url, e))
        })
    }
}

#[async_trait]
impl CatalogSource for PokeApiClient {
    /// Calls `GET {base}pokemon?limit={limit}`.
    async fn list_page(&self, limit: u32) -> Result<Vec<CatalogEntry>, AppError> {
        let url = self.listing_url(limit)?;
        let listing: ListingResponse = self.get_json(url).await?;

        let mut entries = listing.results;
        entries.truncate(limit as usize);
        Ok(entries)
    }

    /// Resolves a detail reference. Relative references are joined onto the base URL.
    ///
    /// The reference comes from the listing body, so one that does not parse
    /// is an undecodable upstream response, not a configuration error.
    async fn fetch_detail(&self, detail_url: &str) -> Result<PokemonDetail, AppError> {
        let url = self.base_url.join(detail_url).map_err(|e| {
            AppError::UpstreamUnavailable(format!(
                "invalid detail reference {:?}: {}",
                detail_url, e
            ))
        })?;

        let dto: PokemonDto = self.get_json(url).await?;
        Ok(dto.into_detail())
    }
}
