//! Bangumi API v0 response types.
//!
//! Every field is optional: the catalog omits or nulls fields freely, and
//! deciding what is mandatory is left to the normalization layer.

use serde::{Deserialize, Serialize};

/// One page of `/v0/users/{id}/collections`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CollectionPage {
    pub data: Option<Vec<RawCollection>>,
    pub total: Option<u64>,
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

impl CollectionPage {
    /// Records on this page; a null or absent `data` is an empty page
    pub fn into_records(self) -> Vec<RawCollection> {
        self.data.unwrap_or_default()
    }
}

/// A collection record as returned by the catalog
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RawCollection {
    pub subject_id: Option<u64>,
    pub subject: Option<RawSubject>,
    pub rate: Option<i64>,
    /// Collection type code (1 = wish ... 5 = dropped)
    #[serde(rename = "type")]
    pub collection_type: Option<u8>,
    pub updated_at: Option<String>,
    pub comment: Option<String>,
    pub tags: Option<Vec<String>>,
    pub ep_status: Option<u32>,
    pub vol_status: Option<u32>,
    pub private: Option<bool>,
}

/// Subject record, either the slim form embedded in collections or the full
/// form from `/v0/subjects/{id}`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RawSubject {
    pub id: Option<u64>,
    pub name: Option<String>,
    pub name_cn: Option<String>,
    #[serde(rename = "type")]
    pub subject_type: Option<u8>,
    pub images: Option<RawImages>,
    pub summary: Option<String>,
    pub short_summary: Option<String>,

    // Dates: legacy payloads use `air_date`, v0 uses `date`
    pub air_date: Option<String>,
    pub date: Option<String>,

    // Episode counts: `eps` on v0, `eps_count` on legacy payloads
    pub eps: Option<u32>,
    pub eps_count: Option<u32>,
    pub total_episodes: Option<u32>,

    // Scores: full subjects nest them under `rating`, slim ones inline them
    pub rating: Option<RawRating>,
    pub score: Option<f64>,
    pub rank: Option<u32>,

    pub tags: Option<Vec<RawTag>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RawImages {
    pub large: Option<String>,
    pub common: Option<String>,
    pub medium: Option<String>,
    pub small: Option<String>,
    pub grid: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RawRating {
    pub score: Option<f64>,
    pub total: Option<u32>,
    pub rank: Option<u32>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RawTag {
    pub name: Option<String>,
    pub count: Option<u32>,
}

/// Public profile from `/v0/users/{username}`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct UserInfo {
    pub id: Option<u64>,
    pub username: String,
    pub nickname: String,
    pub avatar: Option<UserAvatar>,
    pub sign: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct UserAvatar {
    pub large: Option<String>,
    pub medium: Option<String>,
    pub small: Option<String>,
}

impl UserInfo {
    /// Nickname, then username, then the id the profile was requested with
    pub fn display_name<'a>(&'a self, requested_id: &'a str) -> &'a str {
        [self.nickname.as_str(), self.username.as_str()]
            .into_iter()
            .find(|name| !name.is_empty())
            .unwrap_or(requested_id)
    }
}

/// Error body returned by the catalog on failures
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiError {
    pub title: String,
    pub description: String,
}
