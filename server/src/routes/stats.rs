use std::collections::BTreeMap;

use axum::Json;
use axum::extract::State;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;
use wayfinder_shared::api::SuccessBody;
use wayfinder_shared::{NavigationStats, Point};

use crate::config::POPULAR_ROUTES_LIMIT;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct StatsResponse {
    pub total_navigations: u64,
    pub popular_routes: BTreeMap<String, u64>,
    pub daily_stats: BTreeMap<String, u64>,
    pub last_reset: DateTime<Utc>,
    pub total_points: usize,
    /// `"Start name → End name"` to count, busiest first.
    pub popular_with_names: Vec<(String, u64)>,
}

/// Human label for a route key. Keys whose endpoints no longer exist are
/// shown raw.
fn route_label(key: &str, points: &[Point]) -> String {
    let name_of = |id: &str| points.iter().find(|p| p.id == id).map(|p| p.name.as_str());
    NavigationStats::split_route_key(key, |id| name_of(id).is_some())
        .and_then(|(start, end)| Some(format!("{} → {}", name_of(start)?, name_of(end)?)))
        .unwrap_or_else(|| key.to_string())
}

fn popular_with_names(stats: &NavigationStats, points: &[Point], limit: usize) -> Vec<(String, u64)> {
    let mut routes: Vec<(&String, &u64)> = stats.popular_routes.iter().collect();
    routes.sort_by(|a, b| b.1.cmp(a.1).then_with(|| a.0.cmp(b.0)));
    routes
        .into_iter()
        .take(limit)
        .map(|(key, &count)| (route_label(key, points), count))
        .collect()
}

pub async fn get_stats(State(state): State<AppState>) -> Json<StatsResponse> {
    let stats = state.stats.read().await.clone();
    let snapshot = state.points.read().await;
    let named = popular_with_names(&stats, &snapshot.points, POPULAR_ROUTES_LIMIT);
    Json(StatsResponse {
        total_navigations: stats.total_navigations,
        popular_routes: stats.popular_routes,
        daily_stats: stats.daily_stats,
        last_reset: stats.last_reset,
        total_points: snapshot.points.len(),
        popular_with_names: named,
    })
}

pub async fn reset_stats(State(state): State<AppState>) -> Json<SuccessBody> {
    state.reset_stats().await;
    info!("navigation statistics reset");
    Json(SuccessBody {
        success: true,
        point: None,
    })
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use serde_json::json;

    use super::*;
    use crate::routes::test_support::{get, json_request, sample_points, sample_state, send};

    #[test]
    fn labels_resolve_underscored_ids_and_fall_back_to_key() {
        let points = sample_points();
        assert_eq!(
            route_label("entrance_1_library", &points),
            "Place entrance_1 → Place library"
        );
        assert_eq!(route_label("entrance_1_gone", &points), "entrance_1_gone");
    }

    #[test]
    fn popular_routes_are_sorted_and_limited() {
        let mut stats = NavigationStats::default();
        stats.popular_routes.insert("stair_1_library".into(), 1);
        stats.popular_routes.insert("entrance_1_library".into(), 5);
        stats.popular_routes.insert("library_stair_2".into(), 3);
        let named = popular_with_names(&stats, &sample_points(), 2);
        assert_eq!(
            named,
            vec![
                ("Place entrance_1 → Place library".to_string(), 5),
                ("Place library → Place stair_2".to_string(), 3),
            ]
        );
    }

    #[tokio::test]
    async fn stats_reflect_navigation_and_reset() {
        let state = sample_state();
        let navigate = json!({"start_id": "entrance_1", "end_id": "library"});
        send(&state, json_request("POST", "/api/navigate", navigate.clone())).await;
        send(&state, json_request("POST", "/api/navigate", navigate)).await;

        let (status, body) = send(&state, get("/api/stats")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["total_navigations"], 2);
        assert_eq!(body["total_points"], 4);
        assert_eq!(body["popular_routes"]["entrance_1_library"], 2);
        assert_eq!(
            body["popular_with_names"],
            json!([["Place entrance_1 → Place library", 2]])
        );

        let (status, body) = send(&state, json_request("POST", "/api/stats/reset", json!({}))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        let (_, body) = send(&state, get("/api/stats")).await;
        assert_eq!(body["total_navigations"], 0);
        assert_eq!(body["popular_with_names"], json!([]));
    }
}
