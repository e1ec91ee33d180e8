//! Derived views over a user's anime collection.
//!
//! All functions here are pure and synchronous: they take the full entry
//! slice and return fresh values, so callers may recompute them on every
//! change.

pub mod stats;
pub mod tags;
pub mod view;

pub use stats::{
    aggregate, aggregate_with_cap, status_distribution, year_distribution, StatsSummary, YearWindow,
};
pub use tags::{analyze_tags, TagCount, TagOptions};
pub use view::{parse_status_filter, view, SortKey, ViewQuery};
