use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use serde_json::Value;
use tracing::{error, info, warn};
use wayfinder_shared::api::SuccessBody;

use super::{ApiError, api_error};
use crate::state::{AppState, MapSnapshot};

pub async fn load_map(State(state): State<AppState>) -> Json<MapSnapshot> {
    Json(state.map.read().await.clone())
}

/// Replace the building geometry wholesale. The body is stored as sent;
/// a body without a `floors` object is rejected and the stored map kept.
pub async fn save_map(
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> Result<Json<SuccessBody>, ApiError> {
    let map = MapSnapshot::from_value(body).map_err(|e| {
        warn!(error = %e, "rejected map upload");
        api_error(StatusCode::BAD_REQUEST, e.to_string())
    })?;
    let floors = map.floor_count();

    let mut current = state.map.write().await;
    *current = map;

    if let Some(store) = state.store.as_ref()
        && let Err(e) = store.save_map(&current).await
    {
        error!(error = %e, "failed to persist map");
        return Err(api_error(
            StatusCode::INTERNAL_SERVER_ERROR,
            "failed to save map",
        ));
    }

    info!(floors, "map saved");
    Ok(Json(SuccessBody {
        success: true,
        point: None,
    }))
}
