//! Collection tracker orchestrator.
//!
//! Coordinates a dashboard load: reuse a fresh cached collection or fetch it,
//! derive statistics and tag preferences, and publish the result only if its
//! request is still the latest one.

use crate::cache::FreshnessCache;
use crate::error::FetchError;
use crate::fetcher::{CollectionSource, PaginatedFetcher};
use crate::session::{FetchSession, RequestToken};
use collection_stats::{
    aggregate_with_cap, analyze_tags, status_distribution, view, year_distribution, SortKey,
    StatsSummary, TagCount, TagOptions, ViewQuery, YearWindow,
};
use shared::config::Config;
use shared::{CollectionEntry, CollectionSet, Status};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

/// Parameters for the derived summaries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DashboardOptions {
    pub top_rated_cap: usize,
    pub tags: TagOptions,
    pub year_window: YearWindow,
    /// Sort applied when the user has not picked one
    pub default_sort: SortKey,
}

impl Default for DashboardOptions {
    fn default() -> Self {
        Self {
            top_rated_cap: collection_stats::stats::TOP_RATED_CAP,
            tags: TagOptions::default(),
            year_window: YearWindow::All,
            default_sort: SortKey::Rating,
        }
    }
}

impl DashboardOptions {
    pub fn from_config(config: &Config) -> Self {
        let default_sort = config.view.default_sort.parse().unwrap_or_else(|e| {
            warn!(error = %e, "Unknown default sort, using rating");
            SortKey::Rating
        });

        Self {
            top_rated_cap: config.stats.top_rated_cap,
            tags: TagOptions {
                rating_threshold: config.tags.rating_threshold,
                per_entry_cap: config.tags.per_entry_cap,
                output_cap: config.tags.output_cap,
            },
            year_window: config.stats.year_window.into(),
            default_sort,
        }
    }
}

/// Everything the presentation layer shows for one user
#[derive(Debug, Clone)]
pub struct Dashboard {
    pub user_id: String,
    pub collections: Arc<CollectionSet>,
    pub stats: StatsSummary,
    pub tags: Vec<TagCount>,
    year_window: YearWindow,
    default_sort: SortKey,
}

impl Dashboard {
    pub fn build(user_id: &str, collections: Arc<CollectionSet>, options: &DashboardOptions) -> Self {
        let stats = aggregate_with_cap(&collections, options.top_rated_cap);
        let tags = analyze_tags(&collections, &options.tags);

        Self {
            user_id: user_id.to_string(),
            collections,
            stats,
            tags,
            year_window: options.year_window,
            default_sort: options.default_sort,
        }
    }

    /// Empty query carrying the configured sort
    pub fn default_query(&self) -> ViewQuery {
        ViewQuery::new(self.default_sort)
    }

    /// Filtered, sorted view of the collection
    pub fn view(&self, query: &ViewQuery) -> Vec<&CollectionEntry> {
        view(&self.collections, query)
    }

    pub fn status_distribution(&self) -> Vec<(Status, usize)> {
        status_distribution(&self.stats)
    }

    /// Year distribution limited to the configured window
    pub fn year_distribution(&self) -> Vec<(String, usize)> {
        year_distribution(&self.stats, self.year_window)
    }
}

/// Loads dashboards through the cache and the paginated fetcher
pub struct Tracker<S> {
    fetcher: PaginatedFetcher<S>,
    cache: FreshnessCache,
    session: FetchSession<Arc<Dashboard>>,
    options: DashboardOptions,
}

impl<S: CollectionSource> Tracker<S> {
    pub fn new(fetcher: PaginatedFetcher<S>, cache: FreshnessCache, options: DashboardOptions) -> Self {
        Self {
            fetcher,
            cache,
            session: FetchSession::new(),
            options,
        }
    }

    /// Build a tracker from configuration around the given source
    pub fn from_config(source: S, config: &Config) -> Self {
        let fetcher = PaginatedFetcher::new(
            source,
            config.api.page_size,
            Duration::from_millis(config.api.page_delay_ms),
        );
        Self::new(
            fetcher,
            FreshnessCache::from_config(&config.cache),
            DashboardOptions::from_config(config),
        )
    }

    pub fn fetcher(&self) -> &PaginatedFetcher<S> {
        &self.fetcher
    }

    pub fn fetcher_mut(&mut self) -> &mut PaginatedFetcher<S> {
        &mut self.fetcher
    }

    /// Dashboard currently on display
    pub fn current(&self) -> Option<Arc<Dashboard>> {
        self.session.current().cloned()
    }

    /// Load the dashboard for a user, reusing a fresh cached collection
    pub async fn load(&mut self, user_id: &str) -> Result<Arc<Dashboard>, FetchError> {
        let token = self.session.begin(user_id);

        let collections = match self.cache.get(user_id) {
            Some(cached) => {
                info!(user_id = user_id, entries = cached.len(), "Using cached collection");
                cached
            }
            None => match self.fetcher.fetch_all(user_id).await {
                Ok(collection) => {
                    let collection = Arc::new(collection);
                    self.cache.set(user_id, Arc::clone(&collection));
                    collection
                }
                Err(e) => {
                    self.session.fail(&token);
                    return Err(e);
                }
            },
        };

        self.publish(&token, collections)
    }

    /// Discard any cached collection and fetch again
    pub async fn refresh(&mut self, user_id: &str) -> Result<Arc<Dashboard>, FetchError> {
        self.cache.invalidate(user_id);
        self.load(user_id).await
    }

    /// Forget the displayed dashboard and pending request (user switch)
    pub fn reset(&mut self) {
        self.session.reset();
    }

    /// Accept the dashboard for `token`, or discard it if the token is stale
    fn publish(
        &mut self,
        token: &RequestToken,
        collections: Arc<CollectionSet>,
    ) -> Result<Arc<Dashboard>, FetchError> {
        let dashboard = Arc::new(Dashboard::build(token.user_id(), collections, &self.options));

        if !self.session.complete(token, Arc::clone(&dashboard)) {
            warn!(user_id = token.user_id(), "Dashboard superseded by a newer request");
            return Err(FetchError::Superseded {
                user_id: token.user_id().to_string(),
            });
        }

        info!(
            user_id = token.user_id(),
            total = dashboard.stats.total,
            average_rating = dashboard.stats.average_rating,
            tags = dashboard.tags.len(),
            "Dashboard ready"
        );

        Ok(dashboard)
    }
}
