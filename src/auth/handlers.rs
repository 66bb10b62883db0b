use axum::{
    extract::{FromRef, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use lazy_static::lazy_static;
use regex::Regex;
use tracing::{error, info, instrument, warn};

use crate::{
    auth::{
        dto::{AuthResponse, LoginRequest, MeResponse, PublicUser, RefreshRequest, RegisterRequest},
        jwt::{AuthUser, JwtKeys},
    },
    state::AppState,
    store::{reject, StoreError},
};

const MIN_PASSWORD_LEN: usize = 8;

pub(crate) fn is_valid_username(username: &str) -> bool {
    lazy_static! {
        static ref USERNAME_RE: Regex = Regex::new(r"^[A-Za-z0-9_.\-]{3,32}$").unwrap();
    }
    USERNAME_RE.is_match(username)
}

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/refresh", post(refresh))
}

pub fn me_routes() -> Router<AppState> {
    Router::new().route("/me", get(get_me))
}

fn internal<E: std::fmt::Display>(e: E) -> (StatusCode, String) {
    error!(error = %e, "internal error");
    (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
}

fn issue_tokens(state: &AppState, user: PublicUser) -> Result<AuthResponse, (StatusCode, String)> {
    let keys = JwtKeys::from_ref(state);
    let access_token = keys.sign_access(&user.username).map_err(internal)?;
    let refresh_token = keys.sign_refresh(&user.username).map_err(internal)?;
    Ok(AuthResponse {
        access_token,
        refresh_token,
        user,
    })
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    Json(mut payload): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), (StatusCode, String)> {
    payload.username = payload.username.trim().to_string();
    payload.display_name = payload.display_name.trim().to_string();

    if !is_valid_username(&payload.username) {
        warn!(username = %payload.username, "invalid username");
        return Err((StatusCode::BAD_REQUEST, "Invalid username".into()));
    }

    if payload.password.chars().count() < MIN_PASSWORD_LEN {
        warn!("password too short");
        return Err((StatusCode::BAD_REQUEST, "Password too short".into()));
    }

    if payload.display_name.is_empty() {
        payload.display_name = payload.username.clone();
    }

    let RegisterRequest {
        username,
        password,
        display_name,
        anonymous,
    } = payload;

    let taken = {
        let username = username.clone();
        state.run_store(move |store| store.get(&username).is_some()).await?
    };
    if taken {
        return Err(reject(StoreError::DuplicateUsername { username }));
    }

    // Argon2 is CPU-bound; run it off the async workers and outside the lock.
    let hasher = state.hasher.clone();
    let password_hash = tokio::task::spawn_blocking(move || hasher.hash(&password))
        .await
        .map_err(internal)?
        .map_err(|e| {
            reject(StoreError::Hashing {
                reason: e.to_string(),
            })
        })?;

    let user = state
        .run_store(move |store| {
            store.register_hashed(&username, password_hash, &display_name, anonymous)?;
            let record = store
                .get(&username)
                .ok_or_else(|| StoreError::UnknownUser {
                    username: username.clone(),
                })?;
            Ok::<_, StoreError>(PublicUser::from_record(&username, record))
        })
        .await?
        .map_err(reject)?;

    let response = issue_tokens(&state, user)?;
    info!(user_id = %response.user.id, username = %response.user.username, "user registered");
    Ok((StatusCode::CREATED, Json(response)))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, (StatusCode, String)> {
    let username = payload.username.trim().to_string();

    // Copy the hash out under the lock; verify after releasing it.
    let found = {
        let username = username.clone();
        state
            .run_store(move |store| {
                store.get(&username).map(|record| {
                    (
                        record.password_hash.clone(),
                        PublicUser::from_record(&username, record),
                    )
                })
            })
            .await?
    };
    let (stored_hash, user) = found.unzip();

    let hasher = state.hasher.clone();
    let verified =
        tokio::task::spawn_blocking(move || hasher.check(&payload.password, stored_hash.as_deref()))
            .await
            .map_err(internal)?;

    let Some(user) = user.filter(|_| verified) else {
        warn!(%username, "login rejected");
        return Err((StatusCode::UNAUTHORIZED, "Invalid credentials".into()));
    };

    let response = issue_tokens(&state, user)?;
    info!(user_id = %response.user.id, %username, "user logged in");
    Ok(Json(response))
}

#[instrument(skip(state, payload))]
pub async fn refresh(
    State(state): State<AppState>,
    Json(payload): Json<RefreshRequest>,
) -> Result<Json<AuthResponse>, (StatusCode, String)> {
    let keys = JwtKeys::from_ref(&state);
    let claims = keys
        .verify_refresh(&payload.refresh_token)
        .map_err(|e| (StatusCode::UNAUTHORIZED, format!("{}", e)))?;

    let username = claims.sub;
    let user = state
        .run_store(move |store| {
            store
                .get(&username)
                .map(|record| PublicUser::from_record(&username, record))
        })
        .await?
        .ok_or((StatusCode::UNAUTHORIZED, "User not found".to_string()))?;

    Ok(Json(issue_tokens(&state, user)?))
}

#[instrument(skip(state))]
pub async fn get_me(
    State(state): State<AppState>,
    AuthUser(username): AuthUser,
) -> Result<Json<MeResponse>, (StatusCode, String)> {
    let name = username.clone();
    state
        .run_store(move |store| {
            let record = store.get(&name)?;
            let today = store.clock().today();
            Some(MeResponse {
                user: PublicUser::from_record(&name, record),
                joined_date: record.joined_date,
                meditation_minutes: record.meditation_minutes,
                mood_entries: record.mood_entries.len(),
                days_active: (today - record.joined_date).whole_days().max(0),
            })
        })
        .await?
        .map(Json)
        .ok_or_else(|| {
            error!(%username, "user not found");
            (StatusCode::UNAUTHORIZED, "User not found".into())
        })
}
