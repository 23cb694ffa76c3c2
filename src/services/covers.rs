use std::sync::Arc;

use axum::body::Bytes;
use reqwest::{header::USER_AGENT, Client as HttpClient};

use crate::store::Catalog;

/// Placeholder shown wherever a cover cannot be produced
pub const NO_COVER: &str = "No Image Cover";

/// Outcome of resolving a book cover
#[derive(Debug, Clone, PartialEq)]
pub enum Cover {
    Image {
        bytes: Bytes,
        content_type: Option<String>,
    },
    Missing,
}

impl Cover {
    pub fn is_missing(&self) -> bool {
        matches!(self, Cover::Missing)
    }
}

/// Source of cover images for titles
///
/// Implementations never fail: any problem degrades to [`Cover::Missing`].
#[async_trait::async_trait]
pub trait CoverSource: Send + Sync {
    async fn resolve(&self, title: &str) -> Cover;
}

/// Fetches covers from the URLs stored in the catalog
///
/// One GET per call, no retries and no caching. Timeouts are whatever the
/// HTTP client was built with.
#[derive(Clone)]
pub struct CoverResolver {
    http_client: HttpClient,
    catalog: Arc<Catalog>,
    user_agent: String,
}

impl CoverResolver {
    pub fn new(catalog: Arc<Catalog>, user_agent: impl Into<String>) -> Self {
        Self::with_client(HttpClient::new(), catalog, user_agent)
    }

    pub fn with_client(
        http_client: HttpClient,
        catalog: Arc<Catalog>,
        user_agent: impl Into<String>,
    ) -> Self {
        Self {
            http_client,
            catalog,
            user_agent: user_agent.into(),
        }
    }

    async fn fetch(&self, url: &str) -> reqwest::Result<Cover> {
        let response = self
            .http_client
            .get(url)
            .header(USER_AGENT, &self.user_agent)
            .send()
            .await?
            .error_for_status()?;

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let bytes = response.bytes().await?;

        Ok(Cover::Image {
            bytes,
            content_type,
        })
    }
}

#[async_trait::async_trait]
impl CoverSource for CoverResolver {
    async fn resolve(&self, title: &str) -> Cover {
        let Some(url) = self.catalog.cover_url(title) else {
            tracing::debug!(title = %title, "No catalog row for cover");
            return Cover::Missing;
        };

        match self.fetch(url).await {
            Ok(cover) => cover,
            Err(e) => {
                tracing::warn!(title = %title, url = %url, error = %e, "Cover fetch failed");
                Cover::Missing
            }
        }
    }
}
