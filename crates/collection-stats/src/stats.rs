//! Aggregate statistics over a user's collection.
//!
//! Everything here is a pure function of the entry slice: the summary is
//! recomputed wholesale whenever the collection changes.

use serde::Serialize;
use shared::{CollectionEntry, Status};
use std::collections::BTreeMap;

/// Default length of the top-rated list
pub const TOP_RATED_CAP: usize = 10;

/// Derived statistics for one collection
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatsSummary {
    pub total: usize,
    /// All five statuses are always present
    pub by_status: BTreeMap<Status, usize>,
    /// Years with no entries are absent
    pub by_year: BTreeMap<String, usize>,
    /// Mean over rated entries only; 0.0 when nothing is rated
    pub average_rating: f64,
    pub rated_count: usize,
    pub top_rated: Vec<CollectionEntry>,
}

impl StatsSummary {
    pub fn count(&self, status: Status) -> usize {
        self.by_status.get(&status).copied().unwrap_or(0)
    }
}

/// How many years of the year distribution to show
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum YearWindow {
    #[default]
    All,
    Last(usize),
}

impl From<Option<usize>> for YearWindow {
    fn from(window: Option<usize>) -> Self {
        match window {
            Some(n) => YearWindow::Last(n),
            None => YearWindow::All,
        }
    }
}

/// Aggregate with the default top-rated cap
pub fn aggregate(entries: &[CollectionEntry]) -> StatsSummary {
    aggregate_with_cap(entries, TOP_RATED_CAP)
}

/// Aggregate a collection into a summary, keeping at most `top_rated_cap`
/// entries in the top-rated list
pub fn aggregate_with_cap(entries: &[CollectionEntry], top_rated_cap: usize) -> StatsSummary {
    let mut by_status: BTreeMap<Status, usize> =
        Status::ALL.iter().map(|&status| (status, 0)).collect();
    let mut by_year: BTreeMap<String, usize> = BTreeMap::new();
    let mut rating_sum: u64 = 0;
    let mut rated_count: usize = 0;

    for entry in entries {
        *by_status.entry(entry.status).or_insert(0) += 1;

        if let Some(year) = entry.subject.air_year() {
            *by_year.entry(year.to_string()).or_insert(0) += 1;
        }

        if entry.is_rated() {
            rating_sum += u64::from(entry.user_rating);
            rated_count += 1;
        }
    }

    let average_rating = if rated_count > 0 {
        rating_sum as f64 / rated_count as f64
    } else {
        0.0
    };

    // sort_by is stable, so equal ratings keep collection order
    let mut top_rated: Vec<CollectionEntry> =
        entries.iter().filter(|e| e.is_rated()).cloned().collect();
    top_rated.sort_by(|a, b| b.user_rating.cmp(&a.user_rating));
    top_rated.truncate(top_rated_cap);

    tracing::debug!(
        total = entries.len(),
        rated = rated_count,
        years = by_year.len(),
        "Aggregated collection statistics"
    );

    StatsSummary {
        total: entries.len(),
        by_status,
        by_year,
        average_rating,
        rated_count,
        top_rated,
    }
}

/// Year counts in ascending year order, optionally limited to the most
/// recent years
pub fn year_distribution(summary: &StatsSummary, window: YearWindow) -> Vec<(String, usize)> {
    let years: Vec<(String, usize)> = summary
        .by_year
        .iter()
        .map(|(year, &count)| (year.clone(), count))
        .collect();

    match window {
        YearWindow::All => years,
        YearWindow::Last(n) => {
            let skip = years.len().saturating_sub(n);
            years.into_iter().skip(skip).collect()
        }
    }
}

/// Non-empty status buckets, in status order, for distribution charts
pub fn status_distribution(summary: &StatsSummary) -> Vec<(Status, usize)> {
    summary
        .by_status
        .iter()
        .filter(|(_, &count)| count > 0)
        .map(|(&status, &count)| (status, count))
        .collect()
}
