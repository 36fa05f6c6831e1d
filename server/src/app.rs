use std::path::Path;

use axum::{
    Router,
    extract::Request,
    http::{HeaderValue, header},
    middleware::{self, Next},
    response::Response,
    routing::{get, post, put},
};
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;

use crate::config;
use crate::routes;
use crate::state::AppState;

pub(crate) fn build_app(state: AppState) -> Router {
    let static_assets = Router::new()
        .fallback_service(
            ServeDir::new(config::static_dir())
                .precompressed_br()
                .precompressed_gzip(),
        )
        .layer(middleware::from_fn(set_static_cache_control));

    let app = Router::new()
        .route(
            "/api/points",
            get(routes::points::list_points).post(routes::points::create_point),
        )
        .route(
            "/api/points/floor/{floor}",
            get(routes::points::points_on_floor),
        )
        .route(
            "/api/points/{id}",
            put(routes::points::update_point).delete(routes::points::delete_point),
        )
        .route("/api/navigate", post(routes::navigation::navigate))
        .route("/api/search", get(routes::points::search))
        .route("/api/load-map", get(routes::map::load_map))
        .route("/api/save-map", post(routes::map::save_map))
        .route("/api/stats", get(routes::stats::get_stats))
        .route("/api/stats/reset", post(routes::stats::reset_stats))
        .route("/api/health", get(routes::health));

    app.layer(CompressionLayer::new())
        .layer(CorsLayer::permissive())
        .fallback_service(static_assets)
        .with_state(state)
}

async fn set_static_cache_control(request: Request, next: Next) -> Response {
    let path = request.uri().path().to_owned();
    let mut response = next.run(request).await;

    if response.status().is_success()
        && let Some(cache_control) = cache_control_for_path(&path)
    {
        response.headers_mut().insert(
            header::CACHE_CONTROL,
            HeaderValue::from_static(cache_control),
        );
    }

    response
}

fn cache_control_for_path(path: &str) -> Option<&'static str> {
    if is_hashed_bundle_asset(path) {
        return Some("public, max-age=31536000, immutable");
    }

    // Floor plans are replaced in place, so they only get a day.
    if path.starts_with("/static/images/") || path.starts_with("/fonts/") {
        return Some("public, max-age=86400");
    }

    None
}

fn is_hashed_bundle_asset(path: &str) -> bool {
    let Some(ext) = Path::new(path).extension().and_then(|ext| ext.to_str()) else {
        return false;
    };

    if !matches!(ext, "wasm" | "js" | "css") {
        return false;
    }

    let Some(filename) = Path::new(path).file_name().and_then(|name| name.to_str()) else {
        return false;
    };

    filename
        .split(['-', '_', '.'])
        .any(|segment| segment.len() >= 8 && segment.chars().all(|c| c.is_ascii_hexdigit()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routes::test_support::{get as get_request, sample_state, send};
    use axum::http::StatusCode;

    #[test]
    fn immutable_cache_for_hashed_bundle_assets() {
        assert_eq!(
            cache_control_for_path("/wayfinder-client-4f0c9e2ab1d37a55_bg.wasm"),
            Some("public, max-age=31536000, immutable")
        );
        assert_eq!(
            cache_control_for_path("/wayfinder-client-4f0c9e2ab1d37a55.js"),
            Some("public, max-age=31536000, immutable")
        );
    }

    #[test]
    fn floor_plans_get_short_cache() {
        assert_eq!(
            cache_control_for_path("/static/images/floor2.jpg"),
            Some("public, max-age=86400")
        );
        // "floor2" is not a content hash
        assert_eq!(cache_control_for_path("/floor2.js"), None);
    }

    #[test]
    fn no_cache_header_override_for_html() {
        assert_eq!(cache_control_for_path("/"), None);
        assert_eq!(cache_control_for_path("/index.html"), None);
    }

    #[tokio::test]
    async fn unknown_api_method_is_rejected() {
        let request = axum::http::Request::delete("/api/navigate")
            .body(axum::body::Body::empty())
            .expect("request");
        let (status, _) = send(&sample_state(), request).await;
        assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    }

    #[tokio::test]
    async fn api_routes_take_precedence_over_static_fallback() {
        let (status, body) = send(&sample_state(), get_request("/api/points")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.as_array().map(Vec::len), Some(4));
    }
}
