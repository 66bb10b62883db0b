use std::sync::{Arc, Mutex, PoisonError};

use anyhow::Context;
use axum::http::StatusCode;
use tracing::error;

use crate::auth::password::Hasher;
use crate::config::AppConfig;
use crate::quotes::{QuoteProvider, ZenQuotes};
use crate::store::UserStore;

#[derive(Clone)]
pub struct AppState {
    store: Arc<Mutex<UserStore>>,
    /// Same hasher the store uses, reachable without taking the lock.
    pub hasher: Hasher,
    pub config: Arc<AppConfig>,
    pub quotes: Arc<dyn QuoteProvider>,
}

impl AppState {
    pub fn init() -> anyhow::Result<Self> {
        let config = Arc::new(AppConfig::from_env()?);

        let store = UserStore::load(&config.store_path)
            .with_context(|| format!("open user store {}", config.store_path.display()))?;

        let quotes = Arc::new(ZenQuotes::new(&config.quotes)?) as Arc<dyn QuoteProvider>;

        Ok(Self::from_parts(store, config, quotes))
    }

    pub fn from_parts(
        store: UserStore,
        config: Arc<AppConfig>,
        quotes: Arc<dyn QuoteProvider>,
    ) -> Self {
        Self {
            hasher: store.hasher().clone(),
            store: Arc::new(Mutex::new(store)),
            config,
            quotes,
        }
    }

    /// Runs `f` with exclusive access to the store. The lock covers the whole
    /// read-modify-write cycle and must not be held across an await.
    ///
    /// A poisoned lock is recovered: mutations only swap in new state after a
    /// successful write, so the map is consistent even if a holder panicked.
    pub fn with_store<T>(&self, f: impl FnOnce(&mut UserStore) -> T) -> T {
        let mut guard = self.store.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut guard)
    }

    /// `with_store` on the blocking pool. Handlers use this so the lock and
    /// the fsync'd write never stall an async worker.
    pub async fn run_store<T, F>(&self, f: F) -> Result<T, (StatusCode, String)>
    where
        T: Send + 'static,
        F: FnOnce(&mut UserStore) -> T + Send + 'static,
    {
        let state = self.clone();
        tokio::task::spawn_blocking(move || state.with_store(f))
            .await
            .map_err(|e| {
                error!(error = %e, "store task failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            })
    }

    #[cfg(test)]
    pub fn fake(dir: &std::path::Path) -> Self {
        Self::fake_with_hasher(dir, Hasher::fast())
    }

    #[cfg(test)]
    pub fn fake_with_hasher(dir: &std::path::Path, hasher: Hasher) -> Self {
        use std::path::PathBuf;

        use async_trait::async_trait;
        use time::macros::datetime;

        use crate::clock::SteppingClock;
        use crate::config::{JwtConfig, QuoteConfig};
        use crate::quotes::{Quote, QuoteError};

        #[derive(Debug)]
        struct FakeQuotes;
        #[async_trait]
        impl QuoteProvider for FakeQuotes {
            async fn fetch(&self) -> Result<Quote, QuoteError> {
                Ok(Quote {
                    text: "Breathe.".into(),
                    author: "Test".into(),
                })
            }
        }

        let store_path: PathBuf = dir.join("users.json");
        let config = Arc::new(AppConfig {
            store_path: store_path.clone(),
            host: "127.0.0.1".into(),
            port: 0,
            jwt: JwtConfig {
                secret: "test".into(),
                issuer: "test".into(),
                audience: "test".into(),
                ttl_minutes: 5,
                refresh_ttl_minutes: 60,
            },
            quotes: QuoteConfig {
                url: "http://fake.local/quote".into(),
                timeout_secs: 1,
            },
        });

        let clock = Arc::new(SteppingClock::starting_at(datetime!(2024-06-01 07:00 UTC)));
        let store = UserStore::load_with(store_path, clock, hasher).expect("fake store");
        Self::from_parts(store, config, Arc::new(FakeQuotes))
    }
}
