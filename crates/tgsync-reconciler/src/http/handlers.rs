//! Request handlers.

use std::sync::Arc;

use axum::{body::Bytes, extract::State, http::header, response::IntoResponse, Json};
use serde_json::Value;
use tracing::error;

use tgsync_core::CoreError;

use crate::error::ReconcileError;
use crate::outcome::InvocationResponse;
use crate::state::AppState;

/// Health check endpoint.
pub async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

/// Prometheus metrics endpoint.
pub async fn metrics_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

/// Lifecycle event endpoint.
///
/// Always answers 200: the outcome, failures included, travels in the body.
pub async fn handle_event(State(state): State<Arc<AppState>>, body: Bytes) -> impl IntoResponse {
    let result = match serde_json::from_slice::<Value>(&body) {
        Ok(payload) => state.reconciler.handle(&payload).await,
        Err(e) => {
            error!(error = %e, "Rejected non-JSON event body");
            Err(ReconcileError::from(CoreError::InvalidEvent(e.to_string())))
        }
    };

    state.metrics.record(&result);
    Json(InvocationResponse::from(result))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use serde_json::json;
    use tower::ServiceExt;

    use tgsync_core::{Target, TargetHealthState, Task};

    use crate::config::ReconcilerConfig;
    use crate::http::create_router;
    use crate::memory::{MemoryDirectory, MemoryRegistry};
    use crate::outcome::InvocationResponse;
    use crate::reconciler::Reconciler;
    use crate::state::AppState;

    fn state() -> Arc<AppState> {
        let directory = MemoryDirectory::new(vec![Task::running("t1").with_private_ip("10.0.0.1")]);
        let registry = MemoryRegistry::new(vec![
            Target::new("10.0.0.1", TargetHealthState::Healthy),
            Target::new("10.0.0.9", TargetHealthState::Unhealthy),
        ]);
        let config = ReconcilerConfig::new("prod", "web", "arn:tg/web").unwrap();
        AppState::new(Reconciler::new(config, Arc::new(directory), Arc::new(registry)))
    }

    async fn post_event(state: Arc<AppState>, body: &str) -> (StatusCode, InvocationResponse) {
        let response = create_router(state)
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/v1/events")
                    .header("content-type", "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();

        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_stopped_event_deregisters() {
        let payload = json!({"detail": {"lastStatus": "STOPPED", "taskArn": "t0"}}).to_string();

        let (status, response) = post_event(state(), &payload).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(response.message, "Successfully deregistered targets.");
        assert_eq!(
            response.deregistered_targets.unwrap()[0].as_str(),
            "10.0.0.9"
        );
        assert_eq!(response.target_group_arn.unwrap().as_str(), "arn:tg/web");
    }

    #[tokio::test]
    async fn test_malformed_body_still_answers_ok() {
        let (status, response) = post_event(state(), "{not json").await;

        assert_eq!(status, StatusCode::OK);
        assert!(response.message.starts_with("Error: Invalid event"));
    }

    #[tokio::test]
    async fn test_metrics_count_invocations() {
        let state = state();
        post_event(state.clone(), r#"{"taskStatus": "RUNNING"}"#).await;
        post_event(state.clone(), r#"{"taskStatus": "PENDING"}"#).await;

        let response = create_router(state)
            .oneshot(Request::builder().uri("/metrics").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let text = String::from_utf8(bytes.to_vec()).unwrap();

        assert!(text.contains("tgsync_invocations_total{outcome=\"registered\"} 1"));
        assert!(text.contains("tgsync_invocations_total{outcome=\"ignored\"} 1"));
    }

    #[tokio::test]
    async fn test_health() {
        let response = create_router(state())
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
