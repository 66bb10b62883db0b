//! Quote of the day.
//!
//! The quote service is optional decoration: any failure is replaced by a
//! fixed fallback line and never reaches the caller as an error.

use async_trait::async_trait;
use axum::{extract::State, routing::get, Json, Router};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{instrument, warn};

use crate::{config::QuoteConfig, state::AppState};

/// Shown when the service answers with a non-success status.
pub const STATUS_FALLBACK: &str = "Keep calm and carry on!";
/// Shown when the service is unreachable or its answer cannot be parsed.
pub const ERROR_FALLBACK: &str = "Stay positive and happy!";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Quote {
    pub text: String,
    pub author: String,
}

impl Quote {
    pub fn render(&self) -> String {
        format!("\"{}\" - {}", self.text, self.author)
    }
}

#[derive(Error, Debug)]
pub enum QuoteError {
    #[error("quote service returned status {0}")]
    Status(u16),

    #[error("quote request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("malformed quote response: {0}")]
    Malformed(String),
}

#[async_trait]
pub trait QuoteProvider: Send + Sync {
    async fn fetch(&self) -> Result<Quote, QuoteError>;
}

/// zenquotes.io style endpoint: a JSON array whose first element carries
/// `q` (quote) and `a` (author).
pub struct ZenQuotes {
    client: reqwest::Client,
    url: String,
}

impl ZenQuotes {
    pub fn new(cfg: &QuoteConfig) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(cfg.timeout())
            .build()?;
        Ok(Self {
            client,
            url: cfg.url.clone(),
        })
    }
}

#[async_trait]
impl QuoteProvider for ZenQuotes {
    async fn fetch(&self) -> Result<Quote, QuoteError> {
        let resp = self.client.get(&self.url).send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(QuoteError::Status(status.as_u16()));
        }
        let body = resp.text().await?;
        parse_zenquotes(&body)
    }
}

pub fn parse_zenquotes(body: &str) -> Result<Quote, QuoteError> {
    #[derive(Deserialize)]
    struct Raw {
        q: String,
        a: String,
    }

    let items: Vec<Raw> =
        serde_json::from_str(body).map_err(|e| QuoteError::Malformed(e.to_string()))?;
    let first = items
        .into_iter()
        .next()
        .ok_or_else(|| QuoteError::Malformed("empty quote list".into()))?;
    Ok(Quote {
        text: first.q,
        author: first.a,
    })
}

/// Rendered quote, or the matching fallback line.
pub async fn quote_of_the_day(provider: &dyn QuoteProvider) -> String {
    match provider.fetch().await {
        Ok(quote) => quote.render(),
        Err(QuoteError::Status(status)) => {
            warn!(status, "quote service unavailable");
            STATUS_FALLBACK.to_string()
        }
        Err(e) => {
            warn!(error = %e, "quote fetch failed");
            ERROR_FALLBACK.to_string()
        }
    }
}

#[derive(Debug, Serialize)]
pub struct QuoteResponse {
    pub quote: String,
}

pub fn router() -> Router<AppState> {
    Router::new().route("/quote", get(get_quote))
}

#[instrument(skip(state))]
pub async fn get_quote(State(state): State<AppState>) -> Json<QuoteResponse> {
    Json(QuoteResponse {
        quote: quote_of_the_day(state.quotes.as_ref()).await,
    })
}
