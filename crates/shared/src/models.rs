//! Data models for the tracker.
//!
//! This module defines the canonical collection shape every other crate works
//! with: subjects, the user's relationship to them, and the status enumeration
//! with its display lookup table.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The user's relationship stage with a subject
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    Wish,
    Collected,
    Watching,
    OnHold,
    Dropped,
}

/// Display metadata attached to each status variant
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusStyle {
    pub label: &'static str,
    pub color: &'static str,
}

// Indexed by `Status as usize`.
const STATUS_STYLES: [StatusStyle; 5] = [
    StatusStyle {
        label: "Want to watch",
        color: "hsl(var(--anime-purple))",
    },
    StatusStyle {
        label: "Completed",
        color: "hsl(var(--anime-green))",
    },
    StatusStyle {
        label: "Watching",
        color: "hsl(var(--primary))",
    },
    StatusStyle {
        label: "On hold",
        color: "hsl(var(--anime-gold))",
    },
    StatusStyle {
        label: "Dropped",
        color: "hsl(var(--muted-foreground))",
    },
];

impl Status {
    /// Every variant, in catalog code order
    pub const ALL: [Status; 5] = [
        Status::Wish,
        Status::Collected,
        Status::Watching,
        Status::OnHold,
        Status::Dropped,
    ];

    /// Numeric collection type used by the catalog API (1..=5)
    pub fn code(self) -> u8 {
        match self {
            Status::Wish => 1,
            Status::Collected => 2,
            Status::Watching => 3,
            Status::OnHold => 4,
            Status::Dropped => 5,
        }
    }

    /// Map a catalog collection type back to a status
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            1 => Some(Status::Wish),
            2 => Some(Status::Collected),
            3 => Some(Status::Watching),
            4 => Some(Status::OnHold),
            5 => Some(Status::Dropped),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Wish => "wish",
            Status::Collected => "collected",
            Status::Watching => "watching",
            Status::OnHold => "on_hold",
            Status::Dropped => "dropped",
        }
    }

    pub fn style(self) -> StatusStyle {
        STATUS_STYLES[self as usize]
    }

    pub fn label(self) -> &'static str {
        self.style().label
    }

    pub fn color(self) -> &'static str {
        self.style().color
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Status {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "wish" => Ok(Status::Wish),
            "collected" => Ok(Status::Collected),
            "watching" => Ok(Status::Watching),
            "on_hold" | "onhold" => Ok(Status::OnHold),
            "dropped" => Ok(Status::Dropped),
            _ => Err(anyhow::anyhow!("Invalid collection status: {}", s)),
        }
    }
}

/// Cover images in the catalog's size variants
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SubjectImages {
    pub large: Option<String>,
    pub common: Option<String>,
    pub medium: Option<String>,
    pub small: Option<String>,
}

/// Global catalog score for a subject
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SubjectRating {
    pub score: f64,
    pub total: u32,
}

/// Catalog tag with its global usage count
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubjectTag {
    pub name: String,
    pub count: u32,
}

/// Catalog metadata for a single title
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subject {
    pub id: u64,

    // Titles
    pub name: String,
    pub name_cn: Option<String>,

    pub images: SubjectImages,
    pub air_date: Option<String>,
    pub episode_count: u32,

    // Scores and rankings
    pub rating: SubjectRating,
    pub rank: u32,

    /// Ordered by global popularity, as returned by the catalog
    pub tags: Vec<SubjectTag>,
    pub summary: String,
}

impl Subject {
    /// Localized name when present and non-empty, otherwise the primary name
    pub fn display_name(&self) -> &str {
        match self.name_cn.as_deref() {
            Some(name) if !name.is_empty() => name,
            _ => &self.name,
        }
    }

    /// First available image, largest first
    pub fn preferred_image(&self) -> Option<&str> {
        [
            &self.images.large,
            &self.images.common,
            &self.images.medium,
            &self.images.small,
        ]
        .into_iter()
        .find_map(|url| url.as_deref().filter(|u| !u.is_empty()))
    }

    /// Leading year token of the air date ("2020-10-03" -> "2020")
    pub fn air_year(&self) -> Option<&str> {
        let date = self.air_date.as_deref()?.trim();
        let year = match date.split_once('-') {
            Some((year, _)) => year,
            None => date,
        };
        if year.is_empty() {
            None
        } else {
            Some(year)
        }
    }
}

/// One user-subject relationship in a collection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectionEntry {
    pub subject_id: u64,
    pub subject: Subject,
    pub status: Status,

    /// 1..=10, or 0 when the user has not rated the subject
    pub user_rating: u8,
    pub updated_at: Option<DateTime<Utc>>,

    pub comment: Option<String>,
    pub user_tags: Vec<String>,
    pub episodes_watched: u32,
}

impl CollectionEntry {
    pub fn is_rated(&self) -> bool {
        self.user_rating > 0
    }
}

/// All collection entries of one user, in the order the catalog returned them
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CollectionSet {
    entries: Vec<CollectionEntry>,
}

impl CollectionSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, entry: CollectionEntry) {
        self.entries.push(entry);
    }

    pub fn entries(&self) -> &[CollectionEntry] {
        &self.entries
    }

    pub fn into_entries(self) -> Vec<CollectionEntry> {
        self.entries
    }
}

impl std::ops::Deref for CollectionSet {
    type Target = [CollectionEntry];

    fn deref(&self) -> &Self::Target {
        &self.entries
    }
}

impl From<Vec<CollectionEntry>> for CollectionSet {
    fn from(entries: Vec<CollectionEntry>) -> Self {
        Self { entries }
    }
}

impl Extend<CollectionEntry> for CollectionSet {
    fn extend<I: IntoIterator<Item = CollectionEntry>>(&mut self, iter: I) {
        self.entries.extend(iter);
    }
}

impl FromIterator<CollectionEntry> for CollectionSet {
    fn from_iter<I: IntoIterator<Item = CollectionEntry>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a CollectionSet {
    type Item = &'a CollectionEntry;
    type IntoIter = std::slice::Iter<'a, CollectionEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
