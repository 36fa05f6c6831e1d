use serde::de::DeserializeOwned;
use wayfinder_shared::MapData;
use wayfinder_shared::Point;
use wayfinder_shared::api::{NavigateRequest, NavigateResponse, SearchHit};

use crate::error::MapError;

async fn get_json<T: DeserializeOwned>(url: &str) -> Result<T, MapError> {
    let resp = gloo_net::http::Request::get(url)
        .send()
        .await
        .map_err(|e| MapError::Network(format!("fetch error: {e}")))?;
    if !resp.ok() {
        return Err(MapError::Network(format!("HTTP {}", resp.status())));
    }
    resp.json::<T>()
        .await
        .map_err(|e| MapError::InvalidData(format!("parse error: {e}")))
}

pub async fn fetch_points() -> Result<Vec<Point>, MapError> {
    get_json("/api/points").await
}

pub async fn fetch_map() -> Result<MapData, MapError> {
    get_json("/api/load-map").await
}

pub fn search_url(query: &str) -> String {
    format!(
        "/api/search?q={}",
        String::from(js_sys::encode_uri_component(query.trim()))
    )
}

pub async fn search(query: &str) -> Result<Vec<SearchHit>, MapError> {
    get_json(&search_url(query)).await
}

/// Map a failed navigate status onto the widget error the user sees.
pub fn navigate_status_error(status: u16) -> MapError {
    match status {
        400 => MapError::NoEndpoints,
        404 => MapError::EmptyRoute,
        other => MapError::Network(format!("HTTP {other}")),
    }
}

pub async fn navigate(start_id: &str, end_id: &str) -> Result<NavigateResponse, MapError> {
    let body = NavigateRequest {
        start_id: Some(start_id.to_string()),
        end_id: Some(end_id.to_string()),
    };
    let resp = gloo_net::http::Request::post("/api/navigate")
        .json(&body)
        .map_err(|e| MapError::InvalidData(format!("encode error: {e}")))?
        .send()
        .await
        .map_err(|e| MapError::Network(format!("fetch error: {e}")))?;
    if !resp.ok() {
        return Err(navigate_status_error(resp.status()));
    }
    resp.json::<NavigateResponse>()
        .await
        .map_err(|e| MapError::InvalidData(format!("parse error: {e}")))
}
