//! # routes::status
//!
//! Read-only health endpoint for the notifier.
//!
//! | Method | Path      | Description                                    |
//! |--------|-----------|------------------------------------------------|
//! | GET    | `/health` | Delivery counters and scheduler state          |

use std::sync::Arc;

use axum::{extract::State, response::IntoResponse, routing::get, Json, Router};
use serde_json::json;
use tower_http::trace::TraceLayer;

use crate::state::SharedStats;

/// Handler state: the counters plus the symbol being watched.
#[derive(Clone)]
pub struct StatusContext {
    pub symbol: Arc<str>,
    pub stats:  SharedStats,
}

pub fn router(ctx: StatusContext) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .layer(TraceLayer::new_for_http())
        .with_state(ctx)
}

// ─── GET /health ──────────────────────────────────────────────────────────────

/// ### Response
/// ```json
/// { "ok": true, "symbol": "AVAXUSDT", "state": "IDLE",
///   "cycles": 12, "delivered": 11, "fetch_failures": 1, "send_failures": 0,
///   "rate_limited": 0, "retries_pending": 0,
///   "last_delivered_at": "2026-10-19T12:00:30Z" }
/// ```
pub async fn health_check(State(ctx): State<StatusContext>) -> impl IntoResponse {
    let snap = ctx.stats.snapshot();

    Json(json!({
        "ok":                true,
        "symbol":            &*ctx.symbol,
        "state":             ctx.stats.scheduler_state(),
        "cycles":            snap.cycles,
        "delivered":         snap.delivered,
        "fetch_failures":    snap.fetch_failures,
        "send_failures":     snap.send_failures,
        "rate_limited":      snap.rate_limited,
        "retries_pending":   snap.retries_pending,
        "last_delivered_at": snap.last_delivered_at,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::NotifierStats;
    use serde_json::Value;
    use std::sync::atomic::Ordering;

    #[tokio::test]
    async fn test_health_reports_counters() {
        let stats = Arc::new(NotifierStats::new());
        stats.cycles.fetch_add(2, Ordering::Relaxed);
        stats.record_delivery();
        stats.retries_pending.fetch_add(1, Ordering::AcqRel);

        let app = router(StatusContext { symbol: Arc::from("AVAXUSDT"), stats });
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        let body: Value = reqwest::get(format!("http://{addr}/health"))
            .await
            .unwrap()
            .json()
            .await
            .unwrap();

        assert_eq!(body["ok"], true);
        assert_eq!(body["symbol"], "AVAXUSDT");
        assert_eq!(body["state"], "RETRY_PENDING");
        assert_eq!(body["cycles"], 2);
        assert_eq!(body["delivered"], 1);
        assert!(body["last_delivered_at"].is_string());
    }
}
