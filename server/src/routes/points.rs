use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::Response;
use bytes::Bytes;
use chrono::Utc;
use serde::Deserialize;
use tracing::{error, info};
use wayfinder_shared::api::{SearchHit, SuccessBody};
use wayfinder_shared::{Category, Point, search_points};

use super::{ApiError, api_error, if_none_match_matches, json_bytes_response, not_modified_response};
use crate::state::{AppState, PointsSnapshot};

const POINTS_CACHE_CONTROL: &str = "no-cache";

/// Body of `POST /api/points`. The id is generated when absent.
#[derive(Debug, Deserialize)]
pub struct NewPoint {
    #[serde(default)]
    pub id: Option<String>,
    pub name: String,
    pub x: f64,
    pub y: f64,
    pub floor: i32,
    #[serde(default)]
    pub category: Category,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub q: String,
}

fn points_etag(revision: u64) -> String {
    format!("\"points-{revision}\"")
}

/// `point_<millis>`, suffixed `_2`, `_3`, ... while the id is taken.
fn generated_point_id(points: &[Point], millis: i64) -> String {
    let base = format!("point_{millis}");
    let taken = |id: &str| points.iter().any(|p| p.id == id);
    if !taken(&base) {
        return base;
    }
    let mut n = 2u64;
    loop {
        let id = format!("{base}_{n}");
        if !taken(&id) {
            return id;
        }
        n += 1;
    }
}

/// Serve the pre-serialized point list.
pub async fn list_points(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let (etag, json): (String, Arc<Bytes>) = {
        let snapshot = state.points.read().await;
        (points_etag(snapshot.revision), Arc::clone(&snapshot.json))
    };

    if if_none_match_matches(&headers, &etag) {
        return not_modified_response(POINTS_CACHE_CONTROL, Some(etag.as_str()));
    }

    json_bytes_response((*json).clone(), POINTS_CACHE_CONTROL, Some(etag.as_str()))
}

pub async fn points_on_floor(
    State(state): State<AppState>,
    Path(floor): Path<i32>,
) -> Json<Vec<Point>> {
    let snapshot = state.points.read().await;
    Json(
        snapshot
            .points
            .iter()
            .filter(|p| p.floor == floor)
            .cloned()
            .collect(),
    )
}

/// Apply `edit` to a copy of the point list, then publish and persist it.
/// A failed write leaves the new list in memory and reports 500.
async fn edit_points<R>(
    state: &AppState,
    edit: impl FnOnce(&mut Vec<Point>) -> Result<R, ApiError>,
) -> Result<R, ApiError> {
    let mut snapshot = state.points.write().await;
    let mut points = snapshot.points.clone();
    let out = edit(&mut points)?;
    let revision = snapshot.revision + 1;
    *snapshot = PointsSnapshot::new(revision, points);

    if let Some(store) = state.store.as_ref()
        && let Err(e) = store.save_points(&snapshot.points).await
    {
        error!(error = %e, "failed to persist points");
        return Err(api_error(
            StatusCode::INTERNAL_SERVER_ERROR,
            "failed to save points",
        ));
    }
    Ok(out)
}

pub async fn create_point(
    State(state): State<AppState>,
    Json(new): Json<NewPoint>,
) -> Result<Json<SuccessBody>, ApiError> {
    let requested = new.id.filter(|id| !id.trim().is_empty());
    let millis = Utc::now().timestamp_millis();

    let created = edit_points(&state, |points| {
        let point = Point {
            id: requested
                .clone()
                .unwrap_or_else(|| generated_point_id(points, millis)),
            name: new.name,
            x: new.x,
            y: new.y,
            floor: new.floor,
            category: new.category,
            description: new.description,
        };
        if requested.is_some() && points.iter().any(|p| p.id == point.id) {
            return Err(api_error(
                StatusCode::CONFLICT,
                format!("point {} already exists", point.id),
            ));
        }
        points.push(point.clone());
        Ok(point)
    })
    .await?;

    info!(id = %created.id, floor = created.floor, "point created");
    Ok(Json(SuccessBody {
        success: true,
        point: Some(created),
    }))
}

/// Replace a point. The path id wins over any id in the body.
pub async fn update_point(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(mut point): Json<Point>,
) -> Result<Json<SuccessBody>, ApiError> {
    point.id = id;
    edit_points(&state, |points| {
        let Some(slot) = points.iter_mut().find(|p| p.id == point.id) else {
            return Err(api_error(StatusCode::NOT_FOUND, "Point not found"));
        };
        *slot = point;
        Ok(())
    })
    .await?;

    Ok(Json(SuccessBody {
        success: true,
        point: None,
    }))
}

pub async fn delete_point(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<SuccessBody>, ApiError> {
    let removed = edit_points(&state, |points| {
        let before = points.len();
        points.retain(|p| p.id != id);
        Ok(before - points.len())
    })
    .await?;

    if removed > 0 {
        info!(%id, "point deleted");
    }
    Ok(Json(SuccessBody {
        success: true,
        point: None,
    }))
}

pub async fn search(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Json<Vec<SearchHit>> {
    let snapshot = state.points.read().await;
    Json(
        search_points(
            &snapshot.points,
            &params.q,
            state.search_min_chars,
            state.search_limit,
        )
        .into_iter()
        .map(SearchHit::from)
        .collect(),
    )
}
