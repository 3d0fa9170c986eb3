//! Greeting service routes and server loop

use std::net::SocketAddr;

use axum::{extract::Path, routing::get, Json, Router};
use serde_json::{json, Value};
use tower_http::trace::TraceLayer;
use tracing::info;

/// Build the service router.
///
/// `/hello/` (empty name) falls through to the 404 handler because the
/// `:name` segment never matches an empty path segment.
pub fn router() -> Router {
    Router::new()
        .route("/", get(root))
        .route("/hello/:name", get(hello))
        .layer(TraceLayer::new_for_http())
}

async fn root() -> Json<Value> {
    Json(json!({ "message": "Hello World" }))
}

async fn hello(Path(name): Path<String>) -> Json<Value> {
    // Path extraction percent-decodes the segment, so "Alice%20Smith"
    // arrives here as "Alice Smith"
    Json(json!({ "message": format!("Hello {name}") }))
}

/// Bind and serve until the process is stopped.
pub async fn serve(addr: SocketAddr) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Greeting service listening on http://{}", addr);
    axum::serve(listener, router()).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    async fn get_json(uri: &str) -> (StatusCode, Value) {
        let response = router()
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    #[tokio::test]
    async fn test_root() {
        let (status, body) = get_json("/").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "message": "Hello World" }));
    }

    #[tokio::test]
    async fn test_say_hello() {
        let (status, body) = get_json("/hello/Alice").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "message": "Hello Alice" }));
    }

    #[tokio::test]
    async fn test_say_hello_with_special_chars() {
        let (status, body) = get_json("/hello/Alice%20Smith").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "message": "Hello Alice Smith" }));
    }

    #[tokio::test]
    async fn test_say_hello_empty_name() {
        let (status, _) = get_json("/hello/").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
