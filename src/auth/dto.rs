use serde::{Deserialize, Serialize};
use time::Date;
use uuid::Uuid;

use crate::store::UserRecord;

fn default_anonymous() -> bool {
    true
}

/// Request body for user registration.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub password: String,
    pub display_name: String,
    #[serde(default = "default_anonymous")]
    pub anonymous: bool,
}

/// Request body for login.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Request body for token refresh.
#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

/// Response returned after login, register or refresh.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub user: PublicUser,
}

/// Public part of the user returned to the client.
#[derive(Debug, Serialize)]
pub struct PublicUser {
    pub id: Uuid,
    pub username: String,
    pub display_name: String,
    pub anonymous: bool,
}

impl PublicUser {
    pub fn from_record(username: &str, record: &UserRecord) -> Self {
        Self {
            id: record.id,
            username: username.to_string(),
            display_name: record.display_name.clone(),
            anonymous: record.anonymous,
        }
    }
}

/// Home dashboard for the signed-in user.
#[derive(Debug, Serialize)]
pub struct MeResponse {
    pub user: PublicUser,
    #[serde(with = "iso_date")]
    pub joined_date: Date,
    pub meditation_minutes: u64,
    pub mood_entries: usize,
    pub days_active: i64,
}

time::serde::format_description!(iso_date, Date, "[year]-[month]-[day]");
