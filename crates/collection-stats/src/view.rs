//! Filtered and sorted views over a collection.

use anyhow::anyhow;
use serde::{Deserialize, Serialize};
use shared::{CollectionEntry, Status};
use std::cmp::Ordering;

/// Ordering applied to a view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortKey {
    /// Most recently updated first
    Date,
    /// Highest user rating first, unrated last
    #[default]
    Rating,
    /// Alphabetical by display name, case-folded rather than
    /// locale-collated
    Name,
}

impl SortKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortKey::Date => "date",
            SortKey::Rating => "rating",
            SortKey::Name => "name",
        }
    }
}

impl std::fmt::Display for SortKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for SortKey {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "date" => Ok(SortKey::Date),
            "rating" => Ok(SortKey::Rating),
            "name" => Ok(SortKey::Name),
            _ => Err(anyhow!("Invalid sort key: {}", s)),
        }
    }
}

/// User intents from the presentation layer
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewQuery {
    /// None means "all statuses"
    pub status: Option<Status>,
    pub search: String,
    pub sort: SortKey,
}

impl ViewQuery {
    pub fn new(sort: SortKey) -> Self {
        Self {
            sort,
            ..Self::default()
        }
    }

    pub fn with_status(mut self, status: Option<Status>) -> Self {
        self.status = status;
        self
    }

    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = search.into();
        self
    }
}

/// Parse a status filter where "all" (or empty) means no filter
pub fn parse_status_filter(value: &str) -> anyhow::Result<Option<Status>> {
    let value = value.trim();
    if value.is_empty() || value.eq_ignore_ascii_case("all") {
        return Ok(None);
    }
    value.parse::<Status>().map(Some)
}

/// Filter then sort, leaving the source untouched.
///
/// Any non-empty search text, whitespace included, is matched as a substring.
pub fn view<'a>(entries: &'a [CollectionEntry], query: &ViewQuery) -> Vec<&'a CollectionEntry> {
    let needle = query.search.to_lowercase();

    let mut result: Vec<&CollectionEntry> = entries
        .iter()
        .filter(|e| query.status.map_or(true, |status| e.status == status))
        .filter(|e| needle.is_empty() || matches_search(e, &needle))
        .collect();

    match query.sort {
        SortKey::Date => result.sort_by(|a, b| compare_updated_desc(a, b)),
        SortKey::Rating => result.sort_by(|a, b| b.user_rating.cmp(&a.user_rating)),
        SortKey::Name => result.sort_by(|a, b| compare_names(a, b)),
    }

    result
}

/// `needle` must already be lowercased
fn matches_search(entry: &CollectionEntry, needle: &str) -> bool {
    let subject = &entry.subject;
    subject.name.to_lowercase().contains(needle)
        || subject
            .name_cn
            .as_deref()
            .is_some_and(|name| name.to_lowercase().contains(needle))
}

// Entries without a timestamp go last.
fn compare_updated_desc(a: &CollectionEntry, b: &CollectionEntry) -> Ordering {
    match (a.updated_at, b.updated_at) {
        (Some(a), Some(b)) => b.cmp(&a),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

fn compare_names(a: &CollectionEntry, b: &CollectionEntry) -> Ordering {
    let (a, b) = (a.subject.display_name(), b.subject.display_name());
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::entry;
    use chrono::{TimeZone, Utc};

    fn ids(view: &[&CollectionEntry]) -> Vec<u64> {
        view.iter().map(|e| e.subject_id).collect()
    }

    fn sample() -> Vec<CollectionEntry> {
        let mut a = entry(1, "Monster", Status::Collected, 9);
        a.updated_at = Some(Utc.with_ymd_and_hms(2023, 5, 1, 0, 0, 0).unwrap());
        let mut b = entry(2, "Mushishi", Status::Watching, 0);
        b.subject.name_cn = Some("虫师".to_string());
        b.updated_at = Some(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap());
        let mut c = entry(3, "Akira", Status::Collected, 7);
        c.updated_at = Some(Utc.with_ymd_and_hms(2022, 3, 9, 0, 0, 0).unwrap());
        let d = entry(4, "baccano!", Status::Dropped, 3);
        vec![a, b, c, d]
    }

    #[test]
    fn test_default_query_sorts_by_rating() {
        let entries = sample();
        let result = view(&entries, &ViewQuery::default());
        assert_eq!(ids(&result), vec![1, 3, 4, 2]);
    }

    #[test]
    fn test_status_filter() {
        let entries = sample();
        let query = ViewQuery::new(SortKey::Rating).with_status(Some(Status::Collected));
        assert_eq!(ids(&view(&entries, &query)), vec![1, 3]);

        let query = ViewQuery::new(SortKey::Rating).with_status(Some(Status::OnHold));
        assert!(view(&entries, &query).is_empty());
    }

    #[test]
    fn test_search_matches_either_name_case_insensitively() {
        let entries = sample();

        let query = ViewQuery::new(SortKey::Name).with_search("MON");
        assert_eq!(ids(&view(&entries, &query)), vec![1]);

        let query = ViewQuery::new(SortKey::Name).with_search("虫");
        assert_eq!(ids(&view(&entries, &query)), vec![2]);

        let query = ViewQuery::new(SortKey::Name).with_search("mushi");
        assert_eq!(ids(&view(&entries, &query)), vec![2]);
    }

    #[test]
    fn test_whitespace_search_is_matched_literally() {
        let entries = vec![
            entry(1, "Cowboy Bebop", Status::Collected, 9),
            entry(2, "Akira", Status::Collected, 8),
        ];
        let query = ViewQuery::new(SortKey::Rating).with_search(" ");
        assert_eq!(ids(&view(&entries, &query)), vec![1]);
    }

    #[test]
    fn test_empty_search_returns_everything() {
        let entries = sample();
        let query = ViewQuery::new(SortKey::Date).with_search("");
        assert_eq!(view(&entries, &query).len(), entries.len());
    }

    #[test]
    fn test_sort_by_date_most_recent_first() {
        let entries = sample();
        let result = view(&entries, &ViewQuery::new(SortKey::Date));
        assert_eq!(ids(&result), vec![2, 1, 3, 4]);
    }

    #[test]
    fn test_sort_by_name_uses_display_name() {
        let entries = sample();
        let result = view(&entries, &ViewQuery::new(SortKey::Name));
        // "虫师" sorts after the latin names
        assert_eq!(ids(&result), vec![3, 4, 1, 2]);
    }

    #[test]
    fn test_sort_by_name_is_stable() {
        let entries = vec![
            entry(1, "Same", Status::Collected, 0),
            entry(2, "Other", Status::Collected, 0),
            entry(3, "Same", Status::Collected, 0),
        ];
        let result = view(&entries, &ViewQuery::new(SortKey::Name));
        assert_eq!(ids(&result), vec![2, 1, 3]);
    }

    #[test]
    fn test_view_does_not_mutate_source() {
        let entries = sample();
        let before = entries.clone();
        let _ = view(&entries, &ViewQuery::new(SortKey::Name).with_search("a"));
        assert_eq!(entries, before);
    }

    #[test]
    fn test_parse_status_filter() {
        assert_eq!(parse_status_filter("all").unwrap(), None);
        assert_eq!(parse_status_filter("").unwrap(), None);
        assert_eq!(parse_status_filter("watching").unwrap(), Some(Status::Watching));
        assert!(parse_status_filter("binged").is_err());
    }

    #[test]
    fn test_parse_sort_key() {
        assert_eq!("date".parse::<SortKey>().unwrap(), SortKey::Date);
        assert_eq!("Name".parse::<SortKey>().unwrap(), SortKey::Name);
        let err = "popularity".parse::<SortKey>().unwrap_err();
        assert_eq!(err.to_string(), "Invalid sort key: popularity");
    }
}
