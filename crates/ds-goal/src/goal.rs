// goal.rs — Goal and PhotoEntry: the persisted habit records.
//
// A Goal is something the user wants to do every day. It carries a streak
// counter (consecutive calendar days completed) and the calendar day it was
// last completed on, plus an append-only list of progress photos.
//
// Field names serialize in camelCase so the stored JSON reads
// `createdAt` / `lastCompletedDate`, and calendar days serialize as plain
// `YYYY-MM-DD` strings rather than timestamps.

use chrono::{DateTime, NaiveDate, Utc};
use ds_photo::EncodedImage;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One progress photo attached to a goal. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhotoEntry {
    /// Unique identifier for this photo.
    pub id: Uuid,

    /// When the photo was captured.
    pub date: DateTime<Utc>,

    /// Downsampled JPEG as a data URL.
    pub image: EncodedImage,
}

impl PhotoEntry {
    pub fn new(id: Uuid, image: EncodedImage) -> Self {
        Self {
            id,
            date: Utc::now(),
            image,
        }
    }
}

/// A daily habit goal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Goal {
    /// Unique identifier, never shared with another goal in the collection.
    pub id: Uuid,

    /// Human-readable title (e.g., "Read 20 pages"). Never blank.
    pub title: String,

    /// Free-form description; may be empty.
    #[serde(default)]
    pub description: String,

    /// When this goal was created.
    pub created_at: DateTime<Utc>,

    /// Consecutive calendar days completed, ending at `last_completed_date`.
    #[serde(default)]
    pub streak: u32,

    /// The calendar day this goal was last marked complete, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_completed_date: Option<NaiveDate>,

    /// Progress photos in the order they were attached.
    #[serde(default)]
    pub photos: Vec<PhotoEntry>,
}

impl Goal {
    /// Create a fresh goal: no streak, never completed, no photos.
    pub fn new(id: Uuid, title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            description: description.into(),
            created_at: Utc::now(),
            streak: 0,
            last_completed_date: None,
            photos: Vec::new(),
        }
    }

    /// Whether the goal has been marked complete on `day`.
    pub fn is_completed_on(&self, day: NaiveDate) -> bool {
        self.last_completed_date == Some(day)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn new_goal_starts_empty() {
        let g = Goal::new(Uuid::new_v4(), "Read", "20 pages");
        assert_eq!(g.streak, 0);
        assert!(g.last_completed_date.is_none());
        assert!(g.photos.is_empty());
    }

    #[test]
    fn serializes_camel_case_with_calendar_day() {
        let mut g = Goal::new(Uuid::new_v4(), "Read", "");
        g.streak = 5;
        g.last_completed_date = Some(day("2024-01-01"));

        let json = serde_json::to_string(&g).unwrap();
        assert!(json.contains("\"createdAt\""));
        assert!(json.contains("\"lastCompletedDate\":\"2024-01-01\""));
        assert!(json.contains("\"streak\":5"));

        let restored: Goal = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, g);
    }

    #[test]
    fn absent_last_completed_date_omitted_from_json() {
        let g = Goal::new(Uuid::new_v4(), "Run", "");
        let json = serde_json::to_string(&g).unwrap();
        assert!(!json.contains("lastCompletedDate"));
        // Deserializing JSON without the field should produce None.
        let restored: Goal = serde_json::from_str(&json).unwrap();
        assert!(restored.last_completed_date.is_none());
    }

    #[test]
    fn negative_streak_is_rejected_on_decode() {
        let json = format!(
            r#"{{"id":"{}","title":"x","createdAt":"2024-01-01T00:00:00Z","streak":-1}}"#,
            Uuid::new_v4()
        );
        assert!(serde_json::from_str::<Goal>(&json).is_err());
    }

    #[test]
    fn completion_compares_calendar_days() {
        let mut g = Goal::new(Uuid::new_v4(), "Stretch", "");
        g.last_completed_date = Some(day("2024-03-10"));
        assert!(g.is_completed_on(day("2024-03-10")));
        assert!(!g.is_completed_on(day("2024-03-11")));
    }
}
