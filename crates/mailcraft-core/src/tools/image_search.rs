//! Image search integration for planning-stage context
//!
//! When a request calls for imagery, the planning stage enriches its prompt
//! with a handful of stock photo URLs so the plan can reference concrete
//! assets. The collaborator contract is deliberately forgiving: at most three
//! URLs, and an empty result on missing credentials or any failure. Image
//! search is an enrichment, never a reason to fail a request.

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;

const UNSPLASH_API_BASE: &str = "https://api.unsplash.com";
const MAX_RESULTS: usize = 3;

/// Looks up candidate image URLs for a query. Never raises; a failed or
/// unconfigured search returns an empty list.
#[async_trait]
pub trait ImageSearch: Send + Sync {
    async fn search(&self, query: &str) -> Vec<String>;
}

pub struct UnsplashClient {
    client: Client,
    access_key: String,
    api_base: String,
}

impl UnsplashClient {
    pub fn new(access_key: String) -> Self {
        Self {
            client: Client::builder()
                .timeout(Duration::from_secs(30))
                .build()
                .unwrap_or_else(|_| Client::new()),
            access_key,
            api_base: UNSPLASH_API_BASE.to_string(),
        }
    }

    pub fn with_api_base(mut self, api_base: String) -> Self {
        self.api_base = api_base.trim_end_matches('/').to_string();
        self
    }
}

#[async_trait]
impl ImageSearch for UnsplashClient {
    async fn search(&self, query: &str) -> Vec<String> {
        let url = format!(
            "{}/search/photos?query={}&per_page={}&client_id={}",
            self.api_base,
            urlencoding::encode(query),
            MAX_RESULTS,
            self.access_key
        );

        let response = match self.client.get(&url).send().await {
            Ok(response) => response,
            Err(e) => {
                log::warn!("image search request failed: {}", e);
                return Vec::new();
            }
        };
        if !response.status().is_success() {
            log::warn!("image search returned HTTP {}", response.status());
            return Vec::new();
        }

        let data: Value = match response.json().await {
            Ok(data) => data,
            Err(e) => {
                log::warn!("failed to parse image search response: {}", e);
                return Vec::new();
            }
        };

        data["results"]
            .as_array()
            .map(|results| {
                results
                    .iter()
                    .filter_map(|image| image["urls"]["regular"].as_str())
                    .map(String::from)
                    .take(MAX_RESULTS)
                    .collect()
            })
            .unwrap_or_default()
    }
}

/// Used when no access key is configured.
pub struct NullImageSearch;

#[async_trait]
impl ImageSearch for NullImageSearch {
    async fn search(&self, _query: &str) -> Vec<String> {
        Vec::new()
    }
}
