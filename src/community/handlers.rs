use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use tracing::{info, instrument, warn};

use crate::{
    auth::jwt::AuthUser,
    state::AppState,
    store::{reject, CommunityPost, StoreError},
};

const MAX_POST_CHARS: usize = 2000;

#[derive(Debug, Deserialize)]
pub struct CreatePostRequest {
    pub content: String,
}

/// Owned feed item, detached from the store lock.
#[derive(Debug, Serialize)]
pub struct FeedItem {
    pub author: String,
    pub content: String,
    #[serde(with = "time::serde::rfc3339")]
    pub date: OffsetDateTime,
}

impl From<CommunityPost<'_>> for FeedItem {
    fn from(p: CommunityPost<'_>) -> Self {
        Self {
            author: p.author.to_string(),
            content: p.content.to_string(),
            date: p.date,
        }
    }
}

pub fn community_routes() -> Router<AppState> {
    Router::new().route("/posts", get(list_posts).post(create_post))
}

#[instrument(skip(state, body))]
pub async fn create_post(
    State(state): State<AppState>,
    AuthUser(username): AuthUser,
    Json(body): Json<CreatePostRequest>,
) -> Result<(StatusCode, Json<FeedItem>), (StatusCode, String)> {
    let content = body.content.trim().to_string();
    if content.is_empty() {
        warn!(%username, "empty post");
        return Err((StatusCode::BAD_REQUEST, "Post content is empty".into()));
    }
    if content.chars().count() > MAX_POST_CHARS {
        return Err((StatusCode::BAD_REQUEST, "Post content is too long".into()));
    }

    let name = username.clone();
    let item = state
        .run_store(move |store| {
            let post = store.append_post(&name, &content)?;
            let author = store
                .get(&name)
                .map(|r| r.public_name().to_string())
                .ok_or_else(|| StoreError::UnknownUser {
                    username: name.clone(),
                })?;
            Ok::<_, StoreError>(FeedItem {
                author,
                content: post.content,
                date: post.timestamp,
            })
        })
        .await?
        .map_err(reject)?;

    info!(%username, "post created");
    Ok((StatusCode::CREATED, Json(item)))
}

/// Community feed, newest first.
pub async fn list_posts(
    State(state): State<AppState>,
    AuthUser(_): AuthUser,
) -> Result<Json<Vec<FeedItem>>, (StatusCode, String)> {
    let feed = state
        .run_store(|store| store.list_posts().map(FeedItem::from).collect::<Vec<_>>())
        .await?;
    Ok(Json(feed))
}
