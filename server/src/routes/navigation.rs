use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use tracing::debug;
use wayfinder_shared::api::{NavigateRequest, NavigateResponse};
use wayfinder_shared::build_route;

use super::{ApiError, api_error};
use crate::state::AppState;

fn non_empty(id: Option<String>) -> Option<String> {
    id.filter(|id| !id.is_empty())
}

/// Server-side routing over the persisted point set. Every request with two
/// known endpoints counts toward the navigation statistics.
pub async fn navigate(
    State(state): State<AppState>,
    Json(request): Json<NavigateRequest>,
) -> Result<Json<NavigateResponse>, ApiError> {
    let (Some(start_id), Some(end_id)) = (non_empty(request.start_id), non_empty(request.end_id))
    else {
        return Err(api_error(
            StatusCode::BAD_REQUEST,
            "Missing start_id or end_id",
        ));
    };

    let route = {
        let snapshot = state.points.read().await;
        let (Some(start), Some(end)) = (snapshot.get(&start_id), snapshot.get(&end_id)) else {
            return Err(api_error(StatusCode::NOT_FOUND, "Path not found"));
        };
        build_route(Some(start), Some(end), &snapshot.points, &state.route_params)
            .map_err(|_| api_error(StatusCode::NOT_FOUND, "Path not found"))?
    };

    state.record_navigation(&start_id, &end_id).await;
    debug!(
        start = %start_id,
        end = %end_id,
        waypoints = route.waypoints.len(),
        "navigation served"
    );

    Ok(Json(NavigateResponse {
        distance: route.total_distance_meters,
        time: route.eta_minutes,
        path: route.waypoints,
    }))
}
