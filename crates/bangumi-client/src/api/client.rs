//! Bangumi API client with client-side rate limiting.

use super::rate_limiter::RateLimiter;
use super::types::*;
use crate::error::FetchError;
use crate::fetcher::{CollectionSource, PageRequest};
use crate::normalize::normalize_subject;
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::header::ACCEPT;
use reqwest::Client;
use serde::de::DeserializeOwned;
use shared::config::ApiConfig;
use shared::Subject;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Bangumi API v0 client
pub struct BangumiClient {
    /// HTTP client
    client: Client,
    /// Base URL for the catalog API
    base_url: String,
    /// Rate limiter
    rate_limiter: RateLimiter,
}

impl BangumiClient {
    /// Create a new client
    pub fn new(
        base_url: impl Into<String>,
        user_agent: &str,
        timeout: Duration,
        rate_limiter: RateLimiter,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            rate_limiter,
        })
    }

    /// Create a client from the `[api]` configuration section
    pub fn from_config(config: &ApiConfig) -> Result<Self> {
        Self::new(
            config.base_url.clone(),
            &config.user_agent,
            Duration::from_secs(config.timeout_secs),
            RateLimiter::new(
                config.rate_limit.requests_per_second,
                config.rate_limit.requests_per_minute,
            ),
        )
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Make a rate-limited GET request and decode the JSON body
    async fn get<T: DeserializeOwned>(
        &mut self,
        endpoint: &str,
        query: &[(&str, String)],
    ) -> Result<T, FetchError> {
        let url = format!("{}{}", self.base_url, endpoint);

        self.rate_limiter.acquire().await;

        debug!(url = %url, "Making API request");

        let response = self
            .client
            .get(&url)
            .header(ACCEPT, "application/json")
            .query(query)
            .send()
            .await
            .map_err(|e| {
                warn!(url = %url, error = %e, "Request error");
                FetchError::from(e)
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ApiError>(&body)
                .ok()
                .map(|e| e.description)
                .filter(|d| !d.is_empty())
                .unwrap_or_else(|| body.clone());

            warn!(
                url = %url,
                status = %status,
                error = %message,
                "Request failed"
            );

            return Err(FetchError::Http {
                status: status.as_u16(),
                body: message,
            });
        }

        let bytes = response.bytes().await?;
        let data = serde_json::from_slice(&bytes).map_err(|e| {
            warn!(url = %url, error = %e, "Failed to parse response");
            FetchError::from(e)
        })?;

        debug!(url = %url, "Request successful");
        Ok(data)
    }

    /// Fetch one page of a user's anime collection
    pub async fn get_collections(&mut self, request: &PageRequest) -> Result<CollectionPage, FetchError> {
        let endpoint = format!("/v0/users/{}/collections", request.user_id);
        self.get(&endpoint, &request.query()).await
    }

    /// Fetch and normalize a single subject
    pub async fn get_subject(&mut self, subject_id: u64) -> Result<Subject, FetchError> {
        debug!(subject_id = subject_id, "Fetching subject details");
        let raw: RawSubject = self.get(&format!("/v0/subjects/{}", subject_id), &[]).await?;
        normalize_subject(raw)
    }

    /// Fetch a user's public profile
    pub async fn get_user(&mut self, username: &str) -> Result<UserInfo, FetchError> {
        info!(user = username, "Fetching user profile");
        self.get(&format!("/v0/users/{}", username), &[]).await
    }
}

#[async_trait]
impl CollectionSource for BangumiClient {
    async fn fetch_page(&mut self, request: &PageRequest) -> Result<Vec<RawCollection>, FetchError> {
        Ok(self.get_collections(request).await?.into_records())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        let client = BangumiClient::new(
            "https://api.bgm.tv/",
            "BangumiTracker/test",
            Duration::from_secs(5),
            RateLimiter::unlimited(),
        );
        assert!(client.is_ok());
        assert_eq!(client.unwrap().base_url(), "https://api.bgm.tv");
    }

    #[test]
    fn test_client_from_config() {
        let config = shared::Config::default();
        let client = BangumiClient::from_config(&config.api).unwrap();
        assert_eq!(client.base_url(), "https://api.bgm.tv");
    }

    #[tokio::test]
    async fn test_connection_failure_is_network_error() {
        // Nothing listens on port 9 of the loopback interface
        let mut client = BangumiClient::new(
            "http://127.0.0.1:9",
            "BangumiTracker/test",
            Duration::from_secs(2),
            RateLimiter::unlimited(),
        )
        .unwrap();

        let result = client.get_subject(1).await;
        assert!(matches!(
            result,
            Err(FetchError::Network(_)) | Err(FetchError::Timeout)
        ));
    }
}
