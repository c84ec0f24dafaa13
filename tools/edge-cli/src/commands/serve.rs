//! Native HTTP host.

use std::sync::Arc;

use anyhow::{Context as _, Result};
use axum::extract::{RawQuery, State};
use axum::http::Method;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use edge_responder::WorkloadResponder;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use super::ServeArgs;
use crate::context::Context;

/// Run the serve command.
pub async fn run(args: ServeArgs, ctx: &Context) -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "edge=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let mut config = ctx.config.responder.clone();
    if let Some(runtime) = args.runtime {
        config.runtime = runtime;
    }
    config.validate()?;

    let addr = args.addr.unwrap_or_else(|| ctx.config.serve.addr.clone());
    let route = args.route.unwrap_or_else(|| ctx.config.serve.route.clone());
    let runtime = config.runtime.clone();

    let app = build_router(Arc::new(WorkloadResponder::new(config)), &route);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .context("Failed to bind to address")?;
    tracing::info!(%addr, %route, %runtime, "Listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    tracing::info!("Server stopped");
    Ok(())
}

/// Mount the responder on `route` for GET and POST.
pub fn build_router(responder: Arc<WorkloadResponder>, route: &str) -> Router {
    Router::new()
        .route(route, get(handle_workload).post(handle_workload))
        .with_state(responder)
}

async fn handle_workload(
    State(responder): State<Arc<WorkloadResponder>>,
    method: Method,
    RawQuery(query): RawQuery,
) -> Response {
    let response = responder
        .handle(method.as_str(), query.as_deref().unwrap_or_default())
        .await;
    if !response.status.is_success() {
        tracing::warn!(status = %response.status, body = %response.body, "Invocation failed");
    }
    response.into_http().into_response()
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}

#[cfg(test)]
mod tests {
    use std::time::{Duration, Instant};

    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use edge_core::ResponderConfig;
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    use super::*;

    fn test_app() -> Router {
        let mut config = ResponderConfig::new("native");
        config.logging.level = "error".to_string();
        build_router(Arc::new(WorkloadResponder::new(config)), "/api/workload")
    }

    async fn body_json(response: Response) -> serde_json::Value {
        let body = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&body).unwrap()
    }

    #[tokio::test]
    async fn test_get_workload() {
        let response = test_app()
            .oneshot(
                Request::builder()
                    .uri("/api/workload?workload=cpu&iterations=100&extra=x")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()["content-type"], "application/json");
        assert_eq!(response.headers()["x-runtime"], "native");
        assert!(response.headers().contains_key("x-request-id"));

        let json = body_json(response).await;
        assert_eq!(json["workload"], "cpu");
        assert_eq!(json["iterations"], 100);
        assert_eq!(json["requestData"]["method"], "GET");
        assert_eq!(json["requestData"]["query"]["extra"], "x");
    }

    #[tokio::test]
    async fn test_post_without_query() {
        let response = test_app()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/workload")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["workload"], "none");
        assert_eq!(json["requestData"]["method"], "POST");
        assert_eq!(json["requestData"]["query"], serde_json::json!({}));
    }

    #[tokio::test]
    async fn test_unknown_route() {
        let response = test_app()
            .oneshot(Request::builder().uri("/other").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_delay_does_not_block_server() {
        let app = test_app();
        let start = Instant::now();

        let slow = app.clone().oneshot(
            Request::builder()
                .uri("/api/workload?workload=delay&delayMs=200")
                .body(Body::empty())
                .unwrap(),
        );
        let fast = async {
            let response = app
                .clone()
                .oneshot(
                    Request::builder()
                        .uri("/api/workload?workload=none")
                        .body(Body::empty())
                        .unwrap(),
                )
                .await
                .unwrap();
            (response, start.elapsed())
        };

        let (slow, (fast, fast_done)) = tokio::join!(slow, fast);
        assert_eq!(fast.status(), StatusCode::OK);
        assert!(fast_done < Duration::from_millis(150));

        let json = body_json(slow.unwrap()).await;
        assert!(json["durationMs"].as_f64().unwrap() >= 200.0);
    }
}
