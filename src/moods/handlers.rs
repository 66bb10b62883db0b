use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use tracing::{info, instrument};

use super::dto::{LogMoodRequest, MoodPoint};
use crate::{
    auth::jwt::AuthUser,
    state::AppState,
    store::{reject, StoreError},
};

pub fn mood_routes() -> Router<AppState> {
    Router::new().route("/moods", get(list_moods).post(log_mood))
}

#[instrument(skip(state, body))]
pub async fn log_mood(
    State(state): State<AppState>,
    AuthUser(username): AuthUser,
    Json(body): Json<LogMoodRequest>,
) -> Result<(StatusCode, Json<MoodPoint>), (StatusCode, String)> {
    let name = username.clone();
    let entry = state
        .run_store(move |store| store.append_mood_entry(&name, body.mood, &body.notes))
        .await?
        .map_err(reject)?;
    info!(%username, mood = ?entry.mood_value, "mood logged");
    Ok((StatusCode::CREATED, Json(entry.into())))
}

/// Mood history in the order it was logged.
#[instrument(skip(state))]
pub async fn list_moods(
    State(state): State<AppState>,
    AuthUser(username): AuthUser,
) -> Result<Json<Vec<MoodPoint>>, (StatusCode, String)> {
    let entries = state
        .run_store(move |store| {
            store
                .get(&username)
                .map(|record| record.mood_entries.clone())
                .ok_or(StoreError::UnknownUser { username })
        })
        .await?
        .map_err(reject)?;
    Ok(Json(entries.into_iter().map(MoodPoint::from).collect()))
}
