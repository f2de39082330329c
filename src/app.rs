use std::future::IntoFuture;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::{middleware, routing::get, Json, Router};
use serde::Serialize;
use tower_http::{catch_panic::CatchPanicLayer, cors::CorsLayer, trace::TraceLayer};

use crate::error::{method_not_allowed, panic_response, route_not_found};
use crate::lifecycle::{drain, Drain, Lifecycle};
use crate::state::AppState;
use crate::users::{self, UserRepository};

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub message: &'static str,
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        message: "Hello World from Axum",
    })
}

pub fn build_app(state: AppState) -> Router {
    Router::new()
        .route("/", get(health))
        .merge(users::router())
        .fallback(route_not_found)
        .with_state(state)
        .layer(middleware::from_fn(method_not_allowed))
        .layer(CatchPanicLayer::custom(panic_response))
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
                     latency: std::time::Duration,
                     span: &tracing::Span| {
                        let status = res.status();
                        span.record("status", tracing::field::display(status));
                        if status.is_server_error() {
                            tracing::error!(%status, ?latency, "response");
                        } else {
                            tracing::info!(%status, ?latency, "response");
                        }
                    },
                ),
        )
}

/// Serves `app` on `addr` until `lifecycle` shuts down, then drains in-flight
/// requests and closes `users` within `grace`.
pub async fn serve(
    app: Router,
    addr: SocketAddr,
    users: Arc<dyn UserRepository>,
    lifecycle: Lifecycle,
    grace: Duration,
) -> anyhow::Result<Drain> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("listening on {}", listener.local_addr()?);
    run(listener, app, users, lifecycle, grace).await
}

async fn run(
    listener: tokio::net::TcpListener,
    app: Router,
    users: Arc<dyn UserRepository>,
    lifecycle: Lifecycle,
    grace: Duration,
) -> anyhow::Result<Drain> {
    let stop = lifecycle.clone();
    let mut server = tokio::spawn(
        axum::serve(listener, app)
            .with_graceful_shutdown(async move { stop.shutting_down().await })
            .into_future(),
    );

    tokio::select! {
        res = &mut server => {
            // The server only returns on its own when accepting fails.
            res??;
            anyhow::bail!("server stopped unexpectedly");
        }
        _ = lifecycle.shutting_down() => {}
    }

    tracing::info!(phase = ?lifecycle.phase(), ?grace, "shutting down");
    let outcome = drain(
        async move {
            match server.await {
                Ok(Ok(())) => {}
                Ok(Err(e)) => tracing::error!(error = %e, "server error while draining"),
                Err(e) => tracing::error!(error = %e, "server task failed"),
            }
            users.close().await;
        },
        grace,
    )
    .await;
    if outcome == Drain::Completed {
        tracing::info!("shutdown complete");
    }
    Ok(outcome)
}
