use std::path::PathBuf;
use std::time::Duration;

use wayfinder_shared::route::DEFAULT_WALK_SPEED_M_PER_MIN;

pub const DEFAULT_SERVER_PORT: u16 = 3000;
pub const DEFAULT_DATA_DIR: &str = "data";
pub const DEFAULT_STATIC_DIR: &str = "client/dist";
pub const DEFAULT_SEARCH_RESULT_LIMIT: usize = 20;
pub const DEFAULT_SEARCH_MIN_CHARS: usize = 2;
pub const DEFAULT_STATS_FLUSH_SECS: u64 = 5;
/// Entries in `popular_with_names`.
pub const POPULAR_ROUTES_LIMIT: usize = 10;

pub const POINTS_FILE: &str = "points.json";
pub const MAP_FILE: &str = "map_data.json";
pub const STATS_FILE: &str = "statistics.json";

pub fn server_port() -> u16 {
    std::env::var("SERVER_PORT")
        .ok()
        .and_then(|value| value.parse::<u16>().ok())
        .filter(|value| *value > 0)
        .unwrap_or(DEFAULT_SERVER_PORT)
}

pub fn data_dir() -> PathBuf {
    std::env::var("WAYFINDER_DATA_DIR")
        .ok()
        .filter(|value| !value.trim().is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR))
}

pub fn static_dir() -> PathBuf {
    std::env::var("STATIC_DIR")
        .ok()
        .filter(|value| !value.trim().is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_STATIC_DIR))
}

pub fn walk_speed_m_per_min() -> f64 {
    std::env::var("WALK_SPEED_M_PER_MIN")
        .ok()
        .and_then(|value| value.parse::<f64>().ok())
        .filter(|value| value.is_finite() && *value > 0.0)
        .unwrap_or(DEFAULT_WALK_SPEED_M_PER_MIN)
}

pub fn search_result_limit() -> usize {
    std::env::var("SEARCH_RESULT_LIMIT")
        .ok()
        .and_then(|value| value.parse::<usize>().ok())
        .filter(|value| *value > 0)
        .unwrap_or(DEFAULT_SEARCH_RESULT_LIMIT)
}

pub fn search_min_chars() -> usize {
    std::env::var("SEARCH_MIN_CHARS")
        .ok()
        .and_then(|value| value.parse::<usize>().ok())
        .filter(|value| *value > 0)
        .unwrap_or(DEFAULT_SEARCH_MIN_CHARS)
}

pub fn stats_flush_interval() -> Duration {
    std::env::var("STATS_FLUSH_SECS")
        .ok()
        .and_then(|value| value.parse::<u64>().ok())
        .filter(|value| *value > 0)
        .map(Duration::from_secs)
        .unwrap_or_else(|| Duration::from_secs(DEFAULT_STATS_FLUSH_SECS))
}
