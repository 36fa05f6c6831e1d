use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use bytes::Bytes;
use chrono::Utc;
use serde::Serialize;
use serde_json::Value;
use tokio::sync::RwLock;
use tracing::warn;
use wayfinder_shared::{MapData, NavigationStats, Point, RouteParams};

use crate::config::{search_min_chars, search_result_limit, walk_speed_m_per_min};
use crate::store::DataStore;

/// Point list plus its pre-serialized JSON, rebuilt on every edit so reads
/// never re-serialize.
#[derive(Debug, Clone)]
pub struct PointsSnapshot {
    pub revision: u64,
    pub points: Vec<Point>,
    pub json: Arc<Bytes>,
}

impl PointsSnapshot {
    pub fn new(revision: u64, points: Vec<Point>) -> Self {
        let json = serde_json::to_vec(&points)
            .map(Bytes::from)
            .unwrap_or_else(|e| {
                warn!(error = %e, "failed to serialize points snapshot");
                Bytes::from_static(b"[]")
            });
        Self {
            revision,
            points,
            json: Arc::new(json),
        }
    }

    pub fn get(&self, id: &str) -> Option<&Point> {
        self.points.iter().find(|p| p.id == id)
    }
}

/// Building geometry exactly as the editor saved it. Only a `floors`
/// object is required; everything inside it is kept verbatim.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct MapSnapshot(Value);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MissingFloors;

impl std::fmt::Display for MissingFloors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("map data must have a \"floors\" object")
    }
}

impl std::error::Error for MissingFloors {}

impl MapSnapshot {
    pub fn from_value(value: Value) -> Result<Self, MissingFloors> {
        if value.get("floors").is_some_and(Value::is_object) {
            Ok(Self(value))
        } else {
            Err(MissingFloors)
        }
    }

    pub fn floor_count(&self) -> usize {
        self.0
            .get("floors")
            .and_then(Value::as_object)
            .map_or(0, |floors| floors.len())
    }
}

impl Default for MapSnapshot {
    fn default() -> Self {
        let value = serde_json::to_value(MapData::default())
            .unwrap_or_else(|_| serde_json::json!({ "floors": {} }));
        Self(value)
    }
}

#[derive(Clone)]
pub struct AppState {
    pub points: Arc<RwLock<PointsSnapshot>>,
    pub map: Arc<RwLock<MapSnapshot>>,
    pub stats: Arc<RwLock<NavigationStats>>,
    /// Set when `stats` has changes the flusher has not written yet.
    pub stats_dirty: Arc<AtomicBool>,
    /// JSON files backing the state. None keeps everything in memory.
    pub store: Option<DataStore>,
    pub route_params: RouteParams,
    pub search_limit: usize,
    pub search_min_chars: usize,
}

impl AppState {
    pub fn new(
        store: Option<DataStore>,
        points: Vec<Point>,
        map: MapSnapshot,
        stats: NavigationStats,
    ) -> Self {
        Self {
            points: Arc::new(RwLock::new(PointsSnapshot::new(1, points))),
            map: Arc::new(RwLock::new(map)),
            stats: Arc::new(RwLock::new(stats)),
            stats_dirty: Arc::new(AtomicBool::new(false)),
            store,
            route_params: RouteParams::default().with_walk_speed(walk_speed_m_per_min()),
            search_limit: search_result_limit(),
            search_min_chars: search_min_chars(),
        }
    }

    pub async fn record_navigation(&self, start_id: &str, end_id: &str) {
        self.stats
            .write()
            .await
            .record(start_id, end_id, Utc::now().date_naive());
        self.stats_dirty.store(true, Ordering::Release);
    }

    pub async fn reset_stats(&self) {
        *self.stats.write().await = NavigationStats::reset_at(Utc::now());
        self.stats_dirty.store(true, Ordering::Release);
    }

    /// Write pending statistics. Returns whether anything was written.
    pub async fn flush_stats(&self) -> bool {
        if !self.stats_dirty.swap(false, Ordering::AcqRel) {
            return false;
        }
        let Some(store) = self.store.as_ref() else {
            return false;
        };
        let snapshot = self.stats.read().await.clone();
        match store.save_stats(&snapshot).await {
            Ok(()) => true,
            Err(e) => {
                warn!(error = %e, "failed to persist statistics, will retry");
                self.stats_dirty.store(true, Ordering::Release);
                false
            }
        }
    }
}

#[cfg(test)]
pub(crate) fn test_point(id: &str, x: f64, y: f64, floor: i32, category: wayfinder_shared::Category) -> Point {
    Point {
        id: id.to_string(),
        name: format!("Place {id}"),
        x,
        y,
        floor,
        category,
        description: String::new(),
    }
}
