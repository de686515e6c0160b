//! Catalog API client.
//!
//! Talks to the store's REST catalog with `reqwest`. Listings and single
//! products are cached using `moka` (5-minute TTL).
//!
//! The listing endpoint may answer with a paginated envelope
//! (`{"results": [...]}`) or with a bare array; both are accepted. Products
//! whose price cannot be normalized are skipped with a warning rather than
//! failing the whole listing.

mod cache;

use std::sync::Arc;
use std::time::Duration;

use medina_core::{PriceError, Product, ProductId, ProductImage, RawProduct};
use moka::future::Cache;
use reqwest::StatusCode;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::{debug, instrument, warn};
use url::Url;

use crate::config::{CatalogConfig, CatalogCredentials};

use cache::{CacheKey, CacheValue};

/// Errors that can occur when talking to the catalog API.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// API returned a non-success status.
    #[error("API error: {status} from {url}")]
    Status { status: u16, url: String },

    /// Product does not exist.
    #[error("Product not found: {0}")]
    NotFound(ProductId),

    /// Product record has a price that cannot be normalized.
    #[error("Product {id} has an invalid price: {source}")]
    InvalidProduct {
        id: ProductId,
        #[source]
        source: PriceError,
    },

    /// Response body is not the expected JSON.
    #[error("Parse error: {0}")]
    Parse(String),

    /// Login was refused or returned no token.
    #[error("Login failed: {0}")]
    Login(String),

    /// A request URL could not be built.
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),
}

/// Listing response: paginated envelope or bare array.
#[derive(Deserialize)]
#[serde(untagged)]
enum ProductListing {
    Page { results: Vec<Value> },
    List(Vec<Value>),
}

impl ProductListing {
    fn into_records(self) -> Vec<Value> {
        match self {
            Self::Page { results } | Self::List(results) => results,
        }
    }
}

#[derive(Deserialize)]
struct LoginResponse {
    token: String,
}

/// Client for the catalog API.
///
/// Cheap to clone; clones share the HTTP pool, the cache, and the token.
#[derive(Clone)]
pub struct CatalogClient {
    inner: Arc<CatalogClientInner>,
}

struct CatalogClientInner {
    client: reqwest::Client,
    api_url: Url,
    media_url: Url,
    credentials: Option<CatalogCredentials>,
    token: RwLock<Option<SecretString>>,
    cache: Cache<CacheKey, CacheValue>,
}

impl CatalogClient {
    /// Create a new catalog client.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build.
    pub fn new(config: &CatalogConfig) -> Result<Self, CatalogError> {
        let cache = Cache::builder()
            .max_capacity(1000)
            .time_to_live(Duration::from_secs(300)) // 5 minutes
            .build();

        Ok(Self {
            inner: Arc::new(CatalogClientInner {
                client: reqwest::Client::builder().build()?,
                api_url: config.api_url.clone(),
                media_url: config.media_url.clone(),
                credentials: config.credentials.clone(),
                token: RwLock::new(config.api_token.clone()),
                cache,
            }),
        })
    }

    /// Exchange the configured credentials for an API token.
    ///
    /// Called lazily before the first request when no static token is set.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Login`] if no credentials are configured or
    /// the API refuses them.
    #[instrument(skip(self))]
    pub async fn login(&self) -> Result<(), CatalogError> {
        let Some(credentials) = &self.inner.credentials else {
            return Err(CatalogError::Login("no credentials configured".into()));
        };

        let url = self.inner.api_url.join("auth/login/")?;
        let body = serde_json::json!({
            "username": credentials.username,
            "password": credentials.password.expose_secret(),
        });
        let response = self.inner.client.post(url).json(&body).send().await?;
        let status = response.status();

        if !status.is_success() {
            warn!(status = %status, "Catalog login refused");
            return Err(CatalogError::Login(format!("HTTP {status}")));
        }

        let login: LoginResponse = response
            .json()
            .await
            .map_err(|e| CatalogError::Login(e.to_string()))?;
        if login.token.trim().is_empty() {
            return Err(CatalogError::Login("empty token".into()));
        }

        *self.inner.token.write().await = Some(SecretString::from(login.token));
        debug!("Catalog login succeeded");
        Ok(())
    }

    /// Fetch every product.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails, the API answers with a
    /// non-success status, or the body is not a product listing.
    #[instrument(skip(self))]
    pub async fn list_products(&self) -> Result<Arc<Vec<Product>>, CatalogError> {
        if let Some(CacheValue::Products(products)) =
            self.inner.cache.get(&CacheKey::Products).await
        {
            debug!("Cache hit for products");
            return Ok(products);
        }

        let body = self.get("products/").await?;
        let listing: ProductListing =
            serde_json::from_str(&body).map_err(|e| CatalogError::Parse(e.to_string()))?;

        let products: Vec<Product> = listing
            .into_records()
            .into_iter()
            .filter_map(|record| match normalize(record) {
                Ok(product) => Some(product),
                Err(e) => {
                    warn!(error = %e, "Skipping catalog product");
                    None
                }
            })
            .collect();
        let products = Arc::new(products);

        self.inner
            .cache
            .insert(CacheKey::Products, CacheValue::Products(Arc::clone(&products)))
            .await;

        Ok(products)
    }

    /// Fetch one product.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::NotFound`] for unknown ids and
    /// [`CatalogError::InvalidProduct`] when its price cannot be normalized.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn product(&self, id: ProductId) -> Result<Product, CatalogError> {
        let key = CacheKey::Product(id);
        if let Some(CacheValue::Product(product)) = self.inner.cache.get(&key).await {
            debug!("Cache hit for product");
            return Ok(*product);
        }

        let body = match self.get(&format!("products/{id}/")).await {
            Err(CatalogError::Status { status: 404, .. }) => return Err(CatalogError::NotFound(id)),
            other => other?,
        };
        let record: Value =
            serde_json::from_str(&body).map_err(|e| CatalogError::Parse(e.to_string()))?;
        let product = normalize(record)?;

        self.inner
            .cache
            .insert(key, CacheValue::Product(Box::new(product.clone())))
            .await;

        Ok(product)
    }

    /// Absolute URL of a product image.
    ///
    /// Relative paths are resolved against the media base; absolute URLs are
    /// returned unchanged.
    #[must_use]
    pub fn image_url(&self, image: &ProductImage) -> Option<Url> {
        Url::parse(&image.url)
            .or_else(|_| self.inner.media_url.join(&image.url))
            .ok()
    }

    /// Drop every cached response.
    pub fn invalidate(&self) {
        self.inner.cache.invalidate_all();
    }

    /// GET a path under the API base and return the body text.
    async fn get(&self, path: &str) -> Result<String, CatalogError> {
        let url = self.inner.api_url.join(path)?;
        let token = self.ensure_token().await?;

        let mut request = self.inner.client.get(url.clone());
        if let Some(token) = &token {
            request = request.header(
                reqwest::header::AUTHORIZATION,
                format!("Token {}", token.expose_secret()),
            );
        }

        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            if status != StatusCode::NOT_FOUND {
                tracing::error!(
                    status = %status,
                    body = %body.chars().take(500).collect::<String>(),
                    "Catalog API returned non-success status"
                );
            }
            return Err(CatalogError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        Ok(body)
    }

    /// Current token, logging in first if only credentials are configured.
    async fn ensure_token(&self) -> Result<Option<SecretString>, CatalogError> {
        if let Some(token) = self.inner.token.read().await.clone() {
            return Ok(Some(token));
        }
        if self.inner.credentials.is_none() {
            return Ok(None);
        }
        self.login().await?;
        Ok(self.inner.token.read().await.clone())
    }
}

impl std::fmt::Debug for CatalogClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CatalogClient")
            .field("api_url", &self.inner.api_url.as_str())
            .field("media_url", &self.inner.media_url.as_str())
            .finish_non_exhaustive()
    }
}

/// Normalize one raw record into a product.
fn normalize(record: Value) -> Result<Product, CatalogError> {
    let raw: RawProduct =
        serde_json::from_value(record).map_err(|e| CatalogError::Parse(e.to_string()))?;
    let id = raw.id;
    Product::try_from(raw).map_err(|source| CatalogError::InvalidProduct { id, source })
}
