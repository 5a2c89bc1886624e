//! Upstream HTTP Producer
//!
//! JSON GET client for the block-explorer and price APIs whose responses the
//! cache fronts. Timeouts live here, not in the cache wrappers.

use std::time::Duration;

use serde_json::Value;
use tracing::debug;

use crate::error::FetchError;

// == Upstream Client ==
#[derive(Debug, Clone)]
pub struct UpstreamClient {
    client: reqwest::Client,
    base_url: String,
}

impl UpstreamClient {
    /// Builds a client for `base_url` whose requests abort after `timeout`.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        let base_url = base_url.into().trim_end_matches('/').to_string();

        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Joins `path` onto the base URL with exactly one slash between them.
    pub fn url_for(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    // == Get JSON ==
    /// GETs `path` and decodes the body as JSON.
    ///
    /// Non-success statuses are errors even when the body is valid JSON.
    pub async fn get_json(&self, path: &str) -> Result<Value, FetchError> {
        let url = self.url_for(path);
        debug!("Fetching upstream {}", url);

        let response = self.client.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
                url,
            });
        }

        response
            .json::<Value>()
            .await
            .map_err(|err| FetchError::Decode(err.to_string()))
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use axum::{http::StatusCode, routing::get, Json, Router};
    use serde_json::json;

    async fn spawn_upstream(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{}", addr)
    }

    fn explorer() -> Router {
        Router::new()
            .route(
                "/api/stats",
                get(|| async { Json(json!({"blocks": 1024, "gas_gwei": 0.1})) }),
            )
            .route(
                "/api/broken",
                get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "oops") }),
            )
            .route("/api/text", get(|| async { "not json" }))
            .route(
                "/api/slow",
                get(|| async {
                    tokio::time::sleep(Duration::from_secs(2)).await;
                    Json(json!({}))
                }),
            )
    }

    #[test]
    fn test_url_for_normalizes_slashes() {
        let client = UpstreamClient::new("http://explorer/", Duration::from_secs(1)).unwrap();

        assert_eq!(client.base_url(), "http://explorer");
        assert_eq!(client.url_for("/api/stats"), "http://explorer/api/stats");
        assert_eq!(client.url_for("api/stats"), "http://explorer/api/stats");
    }

    #[tokio::test]
    async fn test_get_json_success() {
        let base = spawn_upstream(explorer()).await;
        let client = UpstreamClient::new(base, Duration::from_secs(5)).unwrap();

        let value = client.get_json("api/stats").await.unwrap();
        assert_eq!(value, json!({"blocks": 1024, "gas_gwei": 0.1}));
    }

    #[tokio::test]
    async fn test_get_json_error_status() {
        let base = spawn_upstream(explorer()).await;
        let client = UpstreamClient::new(base, Duration::from_secs(5)).unwrap();

        let result = client.get_json("api/broken").await;
        assert!(matches!(result, Err(FetchError::Status { status: 500, .. })));
    }

    #[tokio::test]
    async fn test_get_json_not_found() {
        let base = spawn_upstream(explorer()).await;
        let client = UpstreamClient::new(base, Duration::from_secs(5)).unwrap();

        let result = client.get_json("api/missing").await;
        assert!(matches!(result, Err(FetchError::Status { status: 404, .. })));
    }

    #[tokio::test]
    async fn test_get_json_decode_error() {
        let base = spawn_upstream(explorer()).await;
        let client = UpstreamClient::new(base, Duration::from_secs(5)).unwrap();

        let result = client.get_json("api/text").await;
        assert!(matches!(result, Err(FetchError::Decode(_))));
    }

    #[tokio::test]
    async fn test_get_json_timeout() {
        let base = spawn_upstream(explorer()).await;
        let client = UpstreamClient::new(base, Duration::from_millis(100)).unwrap();

        let result = client.get_json("api/slow").await;
        assert!(matches!(result, Err(FetchError::Timeout(_))));
    }

    #[tokio::test]
    async fn test_get_json_connection_refused() {
        // Bind then drop to get a port nothing listens on
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client =
            UpstreamClient::new(format!("http://{}", addr), Duration::from_secs(1)).unwrap();
        let result = client.get_json("api/stats").await;
        assert!(matches!(result, Err(FetchError::Request(_))));
    }
}
