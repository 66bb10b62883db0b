use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use tracing::{info, instrument, warn};

use super::catalog::{self, Exercise, EXERCISES};
use crate::{auth::jwt::AuthUser, state::AppState, store::reject};

#[derive(Debug, Serialize)]
pub struct SessionCompleted {
    pub exercise: &'static str,
    pub minutes_added: u32,
    pub total_minutes: u64,
}

pub fn meditation_routes() -> Router<AppState> {
    Router::new()
        .route("/meditations", get(list_exercises))
        .route("/meditations/:slug/complete", post(complete_exercise))
}

pub async fn list_exercises() -> Json<&'static [Exercise]> {
    Json(EXERCISES)
}

#[instrument(skip(state))]
pub async fn complete_exercise(
    State(state): State<AppState>,
    AuthUser(username): AuthUser,
    Path(slug): Path<String>,
) -> Result<Json<SessionCompleted>, (StatusCode, String)> {
    let Some(exercise) = catalog::find(&slug) else {
        warn!(%slug, "unknown exercise");
        return Err((StatusCode::NOT_FOUND, "Exercise not found".into()));
    };

    let name = username.clone();
    let minutes = i64::from(exercise.duration_minutes);
    let total_minutes = state
        .run_store(move |store| store.add_meditation_minutes(&name, minutes))
        .await?
        .map_err(reject)?;

    info!(%username, exercise = exercise.slug, total_minutes, "meditation completed");
    Ok(Json(SessionCompleted {
        exercise: exercise.name,
        minutes_added: exercise.duration_minutes,
        total_minutes,
    }))
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    #[tokio::test]
    async fn completing_exercises_accrues_minutes() {
        let dir = TempDir::new().unwrap();
        let state = AppState::fake(dir.path());
        state
            .with_store(|store| store.register("sam", "pw", "Sam", true))
            .unwrap();

        let Json(first) = complete_exercise(
            State(state.clone()),
            AuthUser("sam".into()),
            Path("breathing-exercise".into()),
        )
        .await
        .unwrap();
        assert_eq!(first.minutes_added, 5);
        assert_eq!(first.total_minutes, 5);

        let Json(second) = complete_exercise(
            State(state.clone()),
            AuthUser("sam".into()),
            Path("body-scan".into()),
        )
        .await
        .unwrap();
        assert_eq!(second.total_minutes, 15);

        let stored = state.with_store(|store| store.get("sam").unwrap().meditation_minutes);
        assert_eq!(stored, 15);
    }

    #[tokio::test]
    async fn unknown_exercise_is_not_found() {
        let dir = TempDir::new().unwrap();
        let state = AppState::fake(dir.path());
        let (status, _) = complete_exercise(
            State(state),
            AuthUser("sam".into()),
            Path("nap".into()),
        )
        .await
        .unwrap_err();
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn catalog_lists_every_exercise() {
        let Json(list) = list_exercises().await;
        assert_eq!(list.len(), 3);
        assert_eq!(list[0].name, "Breathing Exercise");
    }
}
