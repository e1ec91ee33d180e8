//! Mapping of raw catalog records into the canonical collection shape.
//!
//! Only identity fields are mandatory. Everything else falls back to an
//! empty or zero value. Display choices (which name, which image, which year)
//! are left to the model so the stored record stays faithful to the source.

use crate::api::types::{RawCollection, RawImages, RawSubject, RawTag};
use crate::error::FetchError;
use chrono::{DateTime, Utc};
use shared::{CollectionEntry, Status, Subject, SubjectImages, SubjectRating, SubjectTag};

/// Status assumed when a record carries no known collection type
pub const FALLBACK_STATUS: Status = Status::Wish;

/// Normalize one collection record
pub fn normalize_collection(raw: RawCollection) -> Result<CollectionEntry, FetchError> {
    let subject_id = raw.subject_id.ok_or(FetchError::MalformedRecord {
        field: "subject_id",
    })?;
    let subject = raw
        .subject
        .ok_or(FetchError::MalformedRecord { field: "subject" })
        .and_then(normalize_subject)?;

    let status = raw
        .collection_type
        .and_then(Status::from_code)
        .unwrap_or(FALLBACK_STATUS);

    Ok(CollectionEntry {
        subject_id,
        subject,
        status,
        user_rating: raw.rate.unwrap_or(0).clamp(0, 10) as u8,
        updated_at: raw.updated_at.as_deref().and_then(parse_timestamp),
        comment: raw.comment.filter(|c| !c.is_empty()),
        user_tags: raw.tags.unwrap_or_default(),
        episodes_watched: raw.ep_status.unwrap_or(0),
    })
}

/// Normalize a subject record (embedded or standalone)
pub fn normalize_subject(raw: RawSubject) -> Result<Subject, FetchError> {
    let id = raw.id.ok_or(FetchError::MalformedRecord { field: "subject.id" })?;
    let name = raw
        .name
        .filter(|n| !n.trim().is_empty())
        .ok_or(FetchError::MalformedRecord {
            field: "subject.name",
        })?;

    let rating = raw.rating.unwrap_or_default();

    Ok(Subject {
        id,
        name,
        name_cn: raw.name_cn,
        images: raw.images.map(normalize_images).unwrap_or_default(),
        air_date: raw.air_date.or(raw.date),
        episode_count: raw
            .eps
            .or(raw.eps_count)
            .or(raw.total_episodes)
            .unwrap_or(0),
        rating: SubjectRating {
            score: rating.score.or(raw.score).unwrap_or(0.0),
            total: rating.total.unwrap_or(0),
        },
        rank: raw.rank.or(rating.rank).unwrap_or(0),
        tags: raw
            .tags
            .unwrap_or_default()
            .into_iter()
            .filter_map(normalize_tag)
            .collect(),
        summary: raw.summary.or(raw.short_summary).unwrap_or_default(),
    })
}

/// Normalize a page of records; the first malformed record fails the page
pub fn normalize_page(records: Vec<RawCollection>) -> Result<Vec<CollectionEntry>, FetchError> {
    records.into_iter().map(normalize_collection).collect()
}

fn normalize_images(raw: RawImages) -> SubjectImages {
    SubjectImages {
        large: raw.large,
        common: raw.common,
        medium: raw.medium,
        small: raw.small,
    }
}

// Nameless tags carry no signal and are dropped.
fn normalize_tag(raw: RawTag) -> Option<SubjectTag> {
    let name = raw.name.filter(|n| !n.is_empty())?;
    Some(SubjectTag {
        name,
        count: raw.count.unwrap_or(0),
    })
}

fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::types::RawRating;
    use crate::test_support::raw_record;
    use chrono::TimeZone;

    #[test]
    fn test_full_record() {
        let mut raw = raw_record(253, "カウボーイビバップ");
        raw.rate = Some(10);
        raw.collection_type = Some(3);
        raw.updated_at = Some("2023-08-01T12:00:00+08:00".to_string());
        raw.tags = Some(vec!["神作".to_string()]);
        raw.ep_status = Some(12);
        if let Some(subject) = raw.subject.as_mut() {
            subject.name_cn = Some("星际牛仔".to_string());
            subject.date = Some("1998-10-23".to_string());
            subject.eps = Some(26);
            subject.rating = Some(RawRating {
                score: Some(8.9),
                total: Some(30000),
                rank: Some(3),
            });
            subject.tags = Some(vec![
                RawTag {
                    name: Some("SF".to_string()),
                    count: Some(2000),
                },
                RawTag {
                    name: None,
                    count: Some(5),
                },
            ]);
        }

        let entry = normalize_collection(raw).unwrap();
        assert_eq!(entry.subject_id, 253);
        assert_eq!(entry.status, Status::Watching);
        assert_eq!(entry.user_rating, 10);
        assert_eq!(
            entry.updated_at,
            Some(Utc.with_ymd_and_hms(2023, 8, 1, 4, 0, 0).unwrap())
        );
        assert_eq!(entry.user_tags, vec!["神作".to_string()]);
        assert_eq!(entry.episodes_watched, 12);

        let subject = &entry.subject;
        assert_eq!(subject.display_name(), "星际牛仔");
        assert_eq!(subject.air_date.as_deref(), Some("1998-10-23"));
        assert_eq!(subject.episode_count, 26);
        assert_eq!(subject.rating.score, 8.9);
        assert_eq!(subject.rank, 3);
        assert_eq!(subject.tags.len(), 1);
    }

    #[test]
    fn test_optional_fields_degrade_to_defaults() {
        let entry = normalize_collection(raw_record(1, "Haibane Renmei")).unwrap();

        assert_eq!(entry.status, FALLBACK_STATUS);
        assert_eq!(entry.user_rating, 0);
        assert_eq!(entry.updated_at, None);
        assert!(entry.user_tags.is_empty());
        assert_eq!(entry.subject.episode_count, 0);
        assert_eq!(entry.subject.summary, "");
        assert!(entry.subject.tags.is_empty());
        assert_eq!(entry.subject.preferred_image(), None);
    }

    #[test]
    fn test_missing_identity_fields() {
        let mut raw = raw_record(1, "x");
        raw.subject_id = None;
        assert!(matches!(
            normalize_collection(raw),
            Err(FetchError::MalformedRecord { field: "subject_id" })
        ));

        let mut raw = raw_record(1, "x");
        raw.subject = None;
        assert!(matches!(
            normalize_collection(raw),
            Err(FetchError::MalformedRecord { field: "subject" })
        ));

        let mut raw = raw_record(1, "x");
        raw.subject.as_mut().unwrap().id = None;
        assert!(matches!(
            normalize_collection(raw),
            Err(FetchError::MalformedRecord { field: "subject.id" })
        ));

        let mut raw = raw_record(1, "x");
        raw.subject.as_mut().unwrap().name = Some("  ".to_string());
        assert!(matches!(
            normalize_collection(raw),
            Err(FetchError::MalformedRecord { field: "subject.name" })
        ));
    }

    #[test]
    fn test_rating_clamped() {
        let mut raw = raw_record(1, "x");
        raw.rate = Some(-3);
        assert_eq!(normalize_collection(raw).unwrap().user_rating, 0);

        let mut raw = raw_record(1, "x");
        raw.rate = Some(42);
        assert_eq!(normalize_collection(raw).unwrap().user_rating, 10);
    }

    #[test]
    fn test_unknown_status_code_falls_back() {
        let mut raw = raw_record(1, "x");
        raw.collection_type = Some(9);
        assert_eq!(normalize_collection(raw).unwrap().status, FALLBACK_STATUS);
    }

    #[test]
    fn test_bad_timestamp_is_dropped() {
        let mut raw = raw_record(1, "x");
        raw.updated_at = Some("yesterday".to_string());
        assert_eq!(normalize_collection(raw).unwrap().updated_at, None);
    }

    #[test]
    fn test_legacy_subject_fields() {
        let raw = RawSubject {
            id: Some(7),
            name: Some("Legacy".to_string()),
            air_date: Some("2004-04-01".to_string()),
            date: Some("2004-04-02".to_string()),
            eps_count: Some(13),
            score: Some(7.5),
            short_summary: Some("short".to_string()),
            ..RawSubject::default()
        };
        let subject = normalize_subject(raw).unwrap();

        assert_eq!(subject.air_date.as_deref(), Some("2004-04-01"));
        assert_eq!(subject.episode_count, 13);
        assert_eq!(subject.rating.score, 7.5);
        assert_eq!(subject.summary, "short");
    }

    #[test]
    fn test_normalize_page_fails_on_first_malformed() {
        let mut bad = raw_record(2, "x");
        bad.subject = None;
        let records = vec![raw_record(1, "ok"), bad, raw_record(3, "ok")];

        assert!(normalize_page(records).is_err());
        assert_eq!(normalize_page(vec![raw_record(1, "ok")]).unwrap().len(), 1);
    }
}
