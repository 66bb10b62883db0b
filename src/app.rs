use axum::{routing::get, Router};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::state::AppState;
use crate::{auth, community, meditation, moods, quotes, resources};

pub fn build_app(state: AppState) -> Router {
    Router::new()
        .nest(
            "/api/v1",
            Router::new()
                .merge(auth::router())
                .merge(moods::router())
                .merge(meditation::router())
                .merge(community::router())
                .merge(quotes::router())
                .merge(resources::router())
                .route("/health", get(|| async { "ok" })),
        )
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|req: &axum::http::Request<_>| {
                    let method = req.method().clone();
                    let uri = req.uri().clone();
                    tracing::info_span!("http_request", %method, uri = %uri, status = tracing::field::Empty)
                })
                .on_response(
                    |res: &axum::http::Response<_>,
                     _latency: std::time::Duration,
                     span: &tracing::Span| {
                        let status = res.status();
                        span.record("status", tracing::field::display(status));
                        if status.is_server_error() {
                            tracing::error!(%status, "response");
                        } else {
                            tracing::info!(%status, "response");
                        }
                    },
                ),
        )
}

pub async fn serve(state: AppState) -> anyhow::Result<()> {
    let addr = state.config.listen_addr()?;
    let app = build_app(state);

    tracing::info!("listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn health_and_auth_are_wired() {
        let dir = tempfile::TempDir::new().unwrap();
        let state = AppState::fake(dir.path());
        let app = build_app(state);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        let client = reqwest::Client::new();
        let health = client
            .get(format!("http://{addr}/api/v1/health"))
            .send()
            .await
            .unwrap();
        assert_eq!(health.status().as_u16(), 200);
        assert_eq!(health.text().await.unwrap(), "ok");

        let me = client
            .get(format!("http://{addr}/api/v1/me"))
            .send()
            .await
            .unwrap();
        assert_eq!(me.status().as_u16(), 401);

        let registered: serde_json::Value = client
            .post(format!("http://{addr}/api/v1/auth/register"))
            .json(&serde_json::json!({
                "username": "sam",
                "password": "long-enough",
                "display_name": "Sam"
            }))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        let token = registered["access_token"].as_str().unwrap().to_string();
        assert_eq!(registered["user"]["anonymous"], true);

        let posted = client
            .post(format!("http://{addr}/api/v1/posts"))
            .bearer_auth(&token)
            .json(&serde_json::json!({ "content": "first!" }))
            .send()
            .await
            .unwrap();
        assert_eq!(posted.status().as_u16(), 201);

        let feed: serde_json::Value = client
            .get(format!("http://{addr}/api/v1/posts"))
            .bearer_auth(&token)
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(feed[0]["author"], "Anonymous");
        assert_eq!(feed[0]["content"], "first!");

        let quote: serde_json::Value = client
            .get(format!("http://{addr}/api/v1/quote"))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(quote["quote"], "\"Breathe.\" - Test");
    }
}
