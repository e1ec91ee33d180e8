//! Paginated retrieval of a user's whole collection.
//!
//! Pages are requested at increasing offsets until a page comes back shorter
//! than requested. The catalog has no continuation token, so the short page
//! is the only end-of-data signal.

use crate::api::types::RawCollection;
use crate::error::FetchError;
use crate::normalize::normalize_collection;
use async_trait::async_trait;
use shared::{CollectionSet, Status};
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, info, warn};

/// Catalog subject type for anime
pub const SUBJECT_TYPE_ANIME: u8 = 2;

/// Records requested per page
pub const DEFAULT_PAGE_SIZE: u32 = 50;

/// Pause between consecutive full pages
pub const DEFAULT_PAGE_DELAY: Duration = Duration::from_millis(200);

/// Parameters of one collection page request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    pub user_id: String,
    pub limit: u32,
    pub offset: u32,
    /// Restrict the page to one collection status
    pub status: Option<Status>,
}

impl PageRequest {
    pub fn new(user_id: impl Into<String>, limit: u32, offset: u32) -> Self {
        Self {
            user_id: user_id.into(),
            limit,
            offset,
            status: None,
        }
    }

    pub fn with_status(mut self, status: Option<Status>) -> Self {
        self.status = status;
        self
    }

    /// Query string parameters for the collections endpoint
    pub fn query(&self) -> Vec<(&'static str, String)> {
        let mut query = vec![
            ("subject_type", SUBJECT_TYPE_ANIME.to_string()),
            ("limit", self.limit.to_string()),
            ("offset", self.offset.to_string()),
        ];
        if let Some(status) = self.status {
            query.push(("type", status.code().to_string()));
        }
        query
    }
}

/// Anything that can serve raw collection pages
#[async_trait]
pub trait CollectionSource: Send {
    async fn fetch_page(&mut self, request: &PageRequest) -> Result<Vec<RawCollection>, FetchError>;
}

/// Fetches every page of a collection and normalizes the records
pub struct PaginatedFetcher<S> {
    source: S,
    page_size: u32,
    page_delay: Duration,
}

impl<S: CollectionSource> PaginatedFetcher<S> {
    /// Create a new fetcher; a zero page size is raised to one
    pub fn new(source: S, page_size: u32, page_delay: Duration) -> Self {
        Self {
            source,
            page_size: page_size.max(1),
            page_delay,
        }
    }

    /// Fetcher with the catalog's usual page size and pacing
    pub fn with_defaults(source: S) -> Self {
        Self::new(source, DEFAULT_PAGE_SIZE, DEFAULT_PAGE_DELAY)
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    /// Retrieve the complete collection of `user_id`.
    ///
    /// Any failed page or malformed record aborts the fetch; nothing
    /// accumulated so far is returned.
    pub async fn fetch_all(&mut self, user_id: &str) -> Result<CollectionSet, FetchError> {
        info!(
            user_id = user_id,
            page_size = self.page_size,
            "Fetching collection"
        );

        let mut collection = CollectionSet::new();
        let mut offset: u32 = 0;
        let mut pages: usize = 0;

        loop {
            let request = PageRequest::new(user_id, self.page_size, offset);
            let records = self.source.fetch_page(&request).await.map_err(|e| {
                warn!(user_id = user_id, offset = offset, error = %e, "Collection page failed");
                e
            })?;
            pages += 1;

            let received = records.len();
            debug!(
                user_id = user_id,
                offset = offset,
                received = received,
                "Received collection page"
            );

            for (idx, raw) in records.into_iter().enumerate() {
                let entry = normalize_collection(raw).map_err(|e| {
                    warn!(
                        user_id = user_id,
                        position = offset as usize + idx,
                        error = %e,
                        "Malformed collection record"
                    );
                    e
                })?;
                collection.push(entry);
            }

            // Short (or empty) page: nothing follows it
            if received < self.page_size as usize {
                break;
            }

            offset += self.page_size;
            sleep(self.page_delay).await;
        }

        info!(
            user_id = user_id,
            pages = pages,
            entries = collection.len(),
            "Collection fetch complete"
        );

        Ok(collection)
    }
}
