pub mod map;
pub mod navigation;
pub mod points;
pub mod stats;

use axum::Json;
use axum::body::Body;
use axum::extract::State;
use axum::http::{HeaderMap, HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use bytes::Bytes;
use wayfinder_shared::api::ErrorBody;

use crate::state::AppState;

pub(crate) type ApiError = (StatusCode, Json<ErrorBody>);

pub(crate) fn api_error(status: StatusCode, message: impl Into<String>) -> ApiError {
    (status, Json(ErrorBody::new(message)))
}

pub async fn health(State(state): State<AppState>) -> Json<serde_json::Value> {
    let point_count = state.points.read().await.points.len();
    let floor_count = state.map.read().await.floor_count();
    Json(serde_json::json!({
        "status": "ok",
        "points": point_count,
        "floors": floor_count,
    }))
}

pub(crate) fn json_bytes_response(
    body: Bytes,
    cache_control: &'static str,
    etag: Option<&str>,
) -> Response {
    let mut response = Response::new(Body::from(body));
    let headers = response.headers_mut();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("application/json"),
    );
    headers.insert(
        header::CACHE_CONTROL,
        HeaderValue::from_static(cache_control),
    );
    if let Some(etag) = etag
        && let Ok(etag_header) = HeaderValue::from_str(etag)
    {
        headers.insert(header::ETAG, etag_header);
    }
    response
}

pub(crate) fn not_modified_response(cache_control: &'static str, etag: Option<&str>) -> Response {
    let mut response = StatusCode::NOT_MODIFIED.into_response();
    let headers = response.headers_mut();
    headers.insert(
        header::CACHE_CONTROL,
        HeaderValue::from_static(cache_control),
    );
    if let Some(etag) = etag
        && let Ok(etag_header) = HeaderValue::from_str(etag)
    {
        headers.insert(header::ETAG, etag_header);
    }
    response
}

fn normalize_etag(candidate: &str) -> &str {
    candidate.strip_prefix("W/").unwrap_or(candidate).trim()
}

pub(crate) fn if_none_match_matches(headers: &HeaderMap, etag: &str) -> bool {
    let Some(value) = headers.get(header::IF_NONE_MATCH) else {
        return false;
    };
    let Ok(raw) = value.to_str() else {
        return false;
    };

    raw.split(',').any(|candidate| {
        let candidate = candidate.trim();
        candidate == "*" || normalize_etag(candidate) == normalize_etag(etag)
    })
}

#[cfg(test)]
pub(crate) mod test_support {
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;
    use wayfinder_shared::{Category, NavigationStats, Point};

    use crate::state::{AppState, MapSnapshot, test_point};

    /// Two floors, one stair each, plus an underscored id.
    pub fn sample_points() -> Vec<Point> {
        vec![
            test_point("entrance_1", 0.0, 0.0, 1, Category::Entrance),
            test_point("stair_1", 10.0, 0.0, 1, Category::Stair),
            test_point("stair_2", 10.0, 0.0, 2, Category::Stair),
            test_point("library", 0.0, 0.0, 2, Category::Library),
        ]
    }

    pub fn sample_state() -> AppState {
        AppState::new(
            None,
            sample_points(),
            MapSnapshot::default(),
            NavigationStats::default(),
        )
    }

    pub async fn send(state: &AppState, request: Request<Body>) -> (StatusCode, serde_json::Value) {
        let response = crate::app::build_app(state.clone())
            .oneshot(request)
            .await
            .expect("router is infallible");
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("read body");
        let json = if body.is_empty() {
            serde_json::Value::Null
        } else {
            serde_json::from_slice(&body).expect("json body")
        };
        (status, json)
    }

    pub fn get(uri: &str) -> Request<Body> {
        Request::get(uri).body(Body::empty()).expect("request")
    }

    pub fn json_request(method: &str, uri: &str, body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .expect("request")
    }
}
