//! HTTP status endpoints.

use agent_state::{ActivityTable, Clock, ReminderStore};
use axum::{extract::State, routing::get, Json, Router};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

/// Shared state for the status handlers.
#[derive(Clone)]
pub struct AppState {
    pub clock: Arc<dyn Clock>,
    pub started_at: DateTime<Utc>,
    pub reminders: ReminderStore,
    pub activity: ActivityTable,
}

#[derive(Debug, Serialize)]
pub struct RootResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub uptime_secs: i64,
    pub pending_reminders: usize,
    pub tracked_users: usize,
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn root(State(state): State<AppState>) -> Json<RootResponse> {
    Json(RootResponse {
        status: "running",
        version: env!("CARGO_PKG_VERSION"),
        timestamp: state.clock.now(),
    })
}

async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let uptime = (state.clock.now() - state.started_at).num_seconds().max(0);

    Json(HealthResponse {
        status: "healthy",
        uptime_secs: uptime,
        pending_reminders: state.reminders.len().await,
        tracked_users: state.activity.tracked_users().await,
    })
}

/// Serve the status endpoints until the listener fails.
pub async fn serve(listener: TcpListener, state: AppState) -> std::io::Result<()> {
    axum::serve(listener, create_router(state)).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use agent_state::ManualClock;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use chrono::TimeZone;
    use tower::ServiceExt;

    fn state(clock: Arc<ManualClock>) -> AppState {
        AppState {
            started_at: clock.now(),
            clock,
            reminders: ReminderStore::new(),
            activity: ActivityTable::new(),
        }
    }

    async fn get_json(router: Router, uri: &str) -> serde_json::Value {
        let response = router
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_root_reports_version() {
        let clock = Arc::new(ManualClock::new(Utc.with_ymd_and_hms(2024, 5, 1, 8, 0, 0).unwrap()));
        let json = get_json(create_router(state(clock)), "/").await;

        assert_eq!(json["status"], "running");
        assert_eq!(json["version"], env!("CARGO_PKG_VERSION"));
        assert_eq!(json["timestamp"], "2024-05-01T08:00:00Z");
    }

    #[tokio::test]
    async fn test_health_counts() {
        let clock = Arc::new(ManualClock::new(Utc.with_ymd_and_hms(2024, 5, 1, 8, 0, 0).unwrap()));
        let state = state(clock.clone());
        let now = clock.now();
        state.activity.record_message(1, now).await;
        state.activity.record_message(2, now).await;
        state
            .reminders
            .insert(1, 1, now + chrono::Duration::minutes(5), "x", now)
            .await
            .unwrap();
        clock.advance(chrono::Duration::seconds(90));

        let json = get_json(create_router(state), "/health").await;
        assert_eq!(json["status"], "healthy");
        assert_eq!(json["uptime_secs"], 90);
        assert_eq!(json["pending_reminders"], 1);
        assert_eq!(json["tracked_users"], 2);
    }
}
