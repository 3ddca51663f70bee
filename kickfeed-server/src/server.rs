//! Axum server setup and router configuration.

use crate::state::AppState;
use axum::{
    Json, Router, extract::State, http::StatusCode, response::IntoResponse, routing::get,
};
use kickfeed_core::entities::{MatchLifecycle, MatchRecord};
use serde::Serialize;
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tokio::sync::watch;

/// Build the status router.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/matches", get(list_matches))
        .with_state(state)
}

/// Health check response.
#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

/// Simple health check - returns OK if the server is running.
async fn health_check() -> impl IntoResponse {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// One registered match as shown on `/matches`.
#[derive(Debug, Serialize)]
struct MatchView {
    match_id: String,
    identity: String,
    home_team: String,
    away_team: String,
    cursor: String,
    lifecycle: MatchLifecycle,
}

impl From<MatchRecord> for MatchView {
    fn from(record: MatchRecord) -> Self {
        Self {
            match_id: record.identity.match_id.clone(),
            identity: record.identity.to_string(),
            home_team: record.teams.home_team_name,
            away_team: record.teams.away_team_name,
            cursor: record.cursor.as_str().to_owned(),
            lifecycle: record.lifecycle,
        }
    }
}

/// Matches currently polled.
async fn list_matches(
    State(state): State<AppState>,
) -> Result<Json<Vec<MatchView>>, StatusCode> {
    let records = state.registry.list_live().await.map_err(|e| {
        tracing::error!(error = %e, "Failed to list live matches");
        StatusCode::INTERNAL_SERVER_ERROR
    })?;
    Ok(Json(records.into_iter().map(MatchView::from).collect()))
}

/// Run the server until the shutdown flag is raised.
pub async fn run_server(
    router: Router,
    addr: SocketAddr,
    mut shutdown_rx: watch::Receiver<bool>,
) -> Result<(), std::io::Error> {
    let listener = TcpListener::bind(addr).await?;
    tracing::info!("Status server listening on {}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(async move {
            let _ = shutdown_rx.wait_for(|stop| *stop).await;
        })
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use kickfeed_core::entities::{MatchIdentity, MatchSummary, TeamDisplay};
    use kickfeed_core::registry::{InMemoryRegistry, MatchRegistry};
    use std::sync::Arc;

    fn summary(match_id: &str) -> MatchSummary {
        MatchSummary {
            identity: MatchIdentity {
                competition_id: "17".into(),
                season_id: "255711".into(),
                stage_id: "285063".into(),
                match_id: match_id.into(),
            },
            teams: TeamDisplay {
                home_team_name: "Netherlands".into(),
                away_team_name: "Argentina".into(),
                home_team_abbrev: "NED".into(),
                away_team_abbrev: "ARG".into(),
            },
        }
    }

    #[tokio::test]
    async fn test_list_matches_shows_registry() {
        let registry = Arc::new(InMemoryRegistry::new());
        registry
            .create(MatchRecord::register(summary("400")))
            .await
            .unwrap();
        let state = AppState::new(registry);

        let Json(matches) = list_matches(State(state)).await.unwrap();

        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].match_id, "400");
        assert_eq!(matches[0].identity, "17/255711/285063/400");
        assert_eq!(matches[0].cursor, "0");
        assert_eq!(matches[0].lifecycle, MatchLifecycle::Live);
    }
}
