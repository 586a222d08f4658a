//! HTTP server for storage notifications.
//!
//! # API Endpoints
//!
//! | Method | Path          | Description                               |
//! |--------|---------------|-------------------------------------------|
//! | GET    | `/health`     | Health check                              |
//! | POST   | `/api/events` | Process a storage notification payload    |
//! | GET    | `/api/logs`   | SSE stream for real-time logs             |

use axum::{
    extract::State,
    http::{header, Method, StatusCode},
    response::{sse::Event, IntoResponse, Json, Response, Sse},
    routing::{get, post},
    Router,
};
use futures::stream::Stream;
use serde_json::{json, Value};
use std::{convert::Infallible, net::SocketAddr, time::Duration};
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::StreamExt as _;
use tower_http::cors::CorsLayer;

use super::logs::{log_error, LOG_BROADCASTER};
use super::types::{error_response, OutcomeResponse};
use crate::error::ServerResult;
use crate::models::{Outcome, StorageEvent};
use crate::storage::{file_name_from_key, report_file_name};
use crate::transform::pipeline::Handler;

/// Build the application router around a configured handler.
pub fn router(handler: Handler) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
        .expose_headers([header::CONTENT_TYPE]);

    Router::new()
        .route("/", get(health))
        .route("/health", get(health))
        .route("/api/events", post(receive_event))
        .route("/api/logs", get(sse_logs))
        .layer(cors)
        .with_state(handler)
}

/// Start the HTTP server
pub async fn start_server(handler: Handler, port: u16) -> ServerResult<()> {
    let app = router(handler.clone());

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    println!("🚀 Reportload server running on http://localhost:{}", port);
    println!("   POST /api/events - Storage notification");
    println!("   GET  /api/logs   - SSE log stream");
    println!("   GET  /health     - Health check");
    println!();
    println!("📦 Store: {}, work dir: {}", handler.store().name(), handler.work_dir().display());

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Health check endpoint
async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": "reportload",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "events": "POST /api/events",
            "logs": "GET /api/logs (SSE)"
        }
    }))
}

/// SSE endpoint for real-time log streaming
async fn sse_logs() -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let rx = LOG_BROADCASTER.subscribe();

    let stream = BroadcastStream::new(rx).filter_map(|result| match result {
        Ok(entry) => {
            let json = serde_json::to_string(&entry).ok()?;
            Some(Ok(Event::default().data(json)))
        }
        Err(_) => None,
    });

    Sse::new(stream).keep_alive(
        axum::response::sse::KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("keep-alive"),
    )
}

/// Storage notification endpoint.
///
/// 200 on success, 422 when the run reported an issue, 400 for a payload
/// that does not name an object, 500 when the upload failed outright.
async fn receive_event(State(handler): State<Handler>, body: String) -> Response {
    let location = match StorageEvent::from_json(&body).and_then(|event| event.location()) {
        Ok(location) => location,
        Err(e) => {
            log_error(format!("Rejected notification: {}", e));
            return (StatusCode::BAD_REQUEST, Json(error_response(&e.to_string()))).into_response();
        }
    };

    println!("\n{}", "=".repeat(70));
    println!("📄 NEW OBJECT: {}", location);
    println!("{}\n", "=".repeat(70));

    match handler.handle(&location).await {
        Ok(outcome) => {
            let status = if outcome.is_success() {
                StatusCode::OK
            } else {
                StatusCode::UNPROCESSABLE_ENTITY
            };
            (status, Json(OutcomeResponse::from(outcome))).into_response()
        }
        Err(e) => {
            let file_name = report_file_name(file_name_from_key(&location.key));
            let response = OutcomeResponse::from(Outcome::issue(file_name, location.bucket))
                .with_error(e.to_string());
            (StatusCode::INTERNAL_SERVER_ERROR, Json(response)).into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::LocalStore;
    use std::sync::Arc;

    fn fixture() -> (tempfile::TempDir, tempfile::TempDir, Handler) {
        let buckets = tempfile::tempdir().unwrap();
        let work = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(buckets.path().join("exports")).unwrap();
        let handler = Handler::new(Arc::new(LocalStore::new(buckets.path())), work.path());
        (buckets, work, handler)
    }

    #[tokio::test]
    async fn test_event_success() {
        let (buckets, _work, handler) = fixture();
        std::fs::write(
            buckets.path().join("exports/people.csv"),
            "Project External System Code,Project Description,Person Account,Person Code,Person First Name,Person Last Name,Project Code,Project Title,Project End Date\nA1,S1,a,b,c,d,e,f,g\n",
        )
        .unwrap();

        let body = serde_json::to_string(&StorageEvent::single("exports", "people.csv")).unwrap();
        let response = receive_event(State(handler), body).await;

        assert_eq!(response.status(), StatusCode::OK);
        assert!(buckets.path().join("exports/reports/people_updated.csv").exists());
    }

    #[tokio::test]
    async fn test_event_issue() {
        let (_buckets, _work, handler) = fixture();

        let body = serde_json::to_string(&StorageEvent::single("exports", "missing.csv")).unwrap();
        let response = receive_event(State(handler), body).await;

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn test_malformed_event() {
        let (_buckets, _work, handler) = fixture();

        let response = receive_event(State(handler.clone()), "{\"Records\": []}".to_string()).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = receive_event(State(handler), "not json".to_string()).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_health() {
        let Json(body) = health().await;
        assert_eq!(body["status"], "ok");
        assert_eq!(body["service"], "reportload");
    }
}
