use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime};
use uuid::Uuid;

time::serde::format_description!(iso_date, Date, "[year]-[month]-[day]");

/// One registered user as persisted in the store file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UserRecord {
    pub id: Uuid,
    pub password_hash: String, // Argon2 PHC string
    pub display_name: String,
    pub anonymous: bool,
    pub mood_entries: Vec<MoodEntry>,
    pub meditation_minutes: u64,
    #[serde(with = "iso_date")]
    pub joined_date: Date,
    pub posts: Vec<Post>,
}

impl UserRecord {
    /// Name shown next to shared content.
    pub fn public_name(&self) -> &str {
        if self.anonymous {
            ANONYMOUS_AUTHOR
        } else {
            &self.display_name
        }
    }
}

pub const ANONYMOUS_AUTHOR: &str = "Anonymous";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct MoodEntry {
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
    pub mood_value: Mood,
    pub notes: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Post {
    pub content: String,
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
}

/// Five-step mood scale, lowest to highest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mood {
    Awful,
    Low,
    Neutral,
    Good,
    Great,
}

impl Mood {
    pub fn score(self) -> u8 {
        match self {
            Mood::Awful => 1,
            Mood::Low => 2,
            Mood::Neutral => 3,
            Mood::Good => 4,
            Mood::Great => 5,
        }
    }
}

/// A post as it appears in the community feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommunityPost<'a> {
    pub author: &'a str,
    pub content: &'a str,
    #[serde(with = "time::serde::rfc3339")]
    pub date: OffsetDateTime,
}
