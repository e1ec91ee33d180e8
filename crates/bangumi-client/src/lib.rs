//! Bangumi collection client.
//!
//! Fetches a user's complete anime collection from the Bangumi API v0,
//! normalizes it, and keeps the latest dashboard built from it.

pub mod api;
pub mod cache;
pub mod error;
pub mod fetcher;
pub mod normalize;
pub mod session;
pub mod tracker;

pub use api::{BangumiClient, RateLimiter};
pub use cache::FreshnessCache;
pub use error::FetchError;
pub use fetcher::{CollectionSource, PageRequest, PaginatedFetcher};
pub use session::{FetchSession, RequestToken};
pub use tracker::{Dashboard, DashboardOptions, Tracker};

#[cfg(test)]
pub(crate) mod test_support {
    use crate::api::types::{RawCollection, RawSubject};
    use crate::error::FetchError;
    use crate::fetcher::{CollectionSource, PageRequest};
    use async_trait::async_trait;
    use std::collections::VecDeque;

    /// Minimal well-formed record
    pub fn raw_record(id: u64, name: &str) -> RawCollection {
        RawCollection {
            subject_id: Some(id),
            subject: Some(RawSubject {
                id: Some(id),
                name: Some(name.to_string()),
                ..RawSubject::default()
            }),
            ..RawCollection::default()
        }
    }

    /// Scripted response for one page request
    pub enum MockPage {
        /// That many generated records with increasing ids
        Records(usize),
        Raw(Vec<RawCollection>),
        Status(u16),
        Timeout,
    }

    /// Serves scripted pages and records every request it sees
    pub struct MockSource {
        pages: VecDeque<MockPage>,
        pub requests: Vec<PageRequest>,
        next_id: u64,
    }

    impl MockSource {
        pub fn new(pages: Vec<MockPage>) -> Self {
            Self {
                pages: pages.into(),
                requests: Vec::new(),
                next_id: 1,
            }
        }
    }

    #[async_trait]
    impl CollectionSource for MockSource {
        async fn fetch_page(&mut self, request: &PageRequest) -> Result<Vec<RawCollection>, FetchError> {
            self.requests.push(request.clone());

            match self.pages.pop_front() {
                Some(MockPage::Records(count)) => {
                    let records = (0..count as u64)
                        .map(|i| {
                            let id = self.next_id + i;
                            raw_record(id, &format!("Subject {id}"))
                        })
                        .collect();
                    self.next_id += count as u64;
                    Ok(records)
                }
                Some(MockPage::Raw(records)) => Ok(records),
                Some(MockPage::Status(status)) => Err(FetchError::Http {
                    status,
                    body: "scripted failure".to_string(),
                }),
                Some(MockPage::Timeout) => Err(FetchError::Timeout),
                None => Ok(Vec::new()),
            }
        }
    }
}
