//! Tag preference ranking.
//!
//! Counts how often catalog tags appear among the subjects a user rated
//! highly. Only the leading tags of each subject are considered; the catalog
//! orders them by global popularity, so the cut keeps the tags that best
//! describe that subject.

use serde::Serialize;
use shared::CollectionEntry;
use std::collections::HashMap;

/// Parameters for the tag ranking
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TagOptions {
    /// Entries rated below this do not contribute
    pub rating_threshold: u8,
    /// Leading tags taken from each contributing subject
    pub per_entry_cap: usize,
    /// Maximum length of the ranking
    pub output_cap: usize,
}

impl Default for TagOptions {
    fn default() -> Self {
        Self {
            rating_threshold: 7,
            per_entry_cap: 6,
            output_cap: 40,
        }
    }
}

/// A tag and the number of highly rated subjects carrying it
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TagCount {
    pub name: String,
    pub count: usize,
}

/// Rank tags by frequency across highly rated entries.
///
/// Ties keep the order in which tags were first seen.
pub fn analyze_tags(entries: &[CollectionEntry], options: &TagOptions) -> Vec<TagCount> {
    let mut ranking: Vec<TagCount> = Vec::new();
    let mut positions: HashMap<&str, usize> = HashMap::new();
    let mut contributing = 0usize;

    for entry in entries
        .iter()
        .filter(|e| e.is_rated() && e.user_rating >= options.rating_threshold)
    {
        contributing += 1;
        for tag in entry.subject.tags.iter().take(options.per_entry_cap) {
            match positions.get(tag.name.as_str()) {
                Some(&idx) => ranking[idx].count += 1,
                None => {
                    positions.insert(tag.name.as_str(), ranking.len());
                    ranking.push(TagCount {
                        name: tag.name.clone(),
                        count: 1,
                    });
                }
            }
        }
    }

    ranking.sort_by(|a, b| b.count.cmp(&a.count));
    ranking.truncate(options.output_cap);

    tracing::debug!(
        contributing_entries = contributing,
        tags = ranking.len(),
        "Ranked tag preferences"
    );

    ranking
}
