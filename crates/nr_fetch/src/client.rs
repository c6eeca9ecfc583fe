use async_trait::async_trait;
use nr_core::error::GENERIC_FETCH_MESSAGE;
use nr_core::{Article, ArticleSource, Error, Result};
use reqwest::Client;
use serde::Deserialize;
use std::fmt;
use std::time::Duration;
use tracing::{info, warn};
use url::Url;

pub const DEFAULT_ENDPOINT: &str = "http://localhost:5000/api/news";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Deserialize)]
struct ErrorBody {
    error: Option<String>,
}

/// Client for the `/api/news` endpoint.
#[derive(Clone)]
pub struct NewsClient {
    client: Client,
    endpoint: Url,
}

impl NewsClient {
    pub fn new(endpoint: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(Error::Http)?;
        Self::with_client(client, endpoint)
    }

    pub fn with_client(client: Client, endpoint: &str) -> Result<Self> {
        let endpoint = Url::parse(endpoint)
            .map_err(|e| Error::InvalidUrl(format!("{}: {}", endpoint, e)))?;
        Ok(Self { client, endpoint })
    }

    fn request_url(&self, category: Option<&str>) -> Url {
        let mut url = self.endpoint.clone();
        if let Some(category) = category.filter(|c| !c.is_empty()) {
            url.query_pairs_mut().append_pair("category", category);
        }
        url
    }
}

impl fmt::Debug for NewsClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NewsClient")
            .field("client", &"<reqwest::Client>")
            .field("endpoint", &self.endpoint.as_str())
            .finish()
    }
}

/// Message for a failed response: the body's `error` field when present.
fn error_message(body: &str) -> String {
    serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|b| b.error)
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| GENERIC_FETCH_MESSAGE.to_string())
}

#[async_trait]
impl ArticleSource for NewsClient {
    fn name(&self) -> &str {
        self.endpoint.as_str()
    }

    async fn fetch_articles(&self, category: Option<&str>) -> Result<Vec<Article>> {
        let url = self.request_url(category);
        info!(%url, category = category.unwrap_or(""), "Fetching articles");

        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| {
                warn!(%url, error = %e, "Request failed");
                Error::fetch(e.to_string(), None)
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = error_message(&body);
            warn!(%url, status = status.as_u16(), %message, "Endpoint returned an error");
            return Err(Error::fetch(message, Some(status.as_u16())));
        }

        let articles = response
            .json::<Vec<Article>>()
            .await
            .map_err(|e| Error::fetch(e.to_string(), Some(status.as_u16())))?;
        info!(count = articles.len(), "Articles received");
        Ok(articles)
    }
}
