use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::store::{Mood, MoodEntry};

#[derive(Debug, Deserialize)]
pub struct LogMoodRequest {
    pub mood: Mood,
    #[serde(default)]
    pub notes: String,
}

/// One point of the mood history, with the numeric score charts plot.
#[derive(Debug, Serialize)]
pub struct MoodPoint {
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
    pub mood: Mood,
    pub score: u8,
    pub notes: String,
}

impl From<MoodEntry> for MoodPoint {
    fn from(e: MoodEntry) -> Self {
        Self {
            timestamp: e.timestamp,
            mood: e.mood_value,
            score: e.mood_value.score(),
            notes: e.notes,
        }
    }
}
