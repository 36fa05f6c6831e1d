use std::io;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{info, warn};
use wayfinder_shared::{NavigationStats, Point};

use crate::config::{MAP_FILE, POINTS_FILE, STATS_FILE};
use crate::state::MapSnapshot;

const SEED_POINTS: &str = include_str!("../data/seed_points.json");

/// Built-in school point set used when no points file exists yet.
pub fn seed_points() -> Vec<Point> {
    match serde_json::from_str(SEED_POINTS) {
        Ok(points) => points,
        Err(e) => {
            warn!(error = %e, "built-in seed points are invalid");
            Vec::new()
        }
    }
}

/// JSON files under one data directory.
#[derive(Debug, Clone)]
pub struct DataStore {
    dir: PathBuf,
}

impl DataStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub async fn load_points(&self) -> io::Result<Vec<Point>> {
        match read_json(&self.dir.join(POINTS_FILE)).await? {
            Some(points) => Ok(points),
            None => {
                let points = seed_points();
                info!(points = points.len(), "no points file, seeding built-in set");
                self.save_points(&points).await?;
                Ok(points)
            }
        }
    }

    pub async fn save_points(&self, points: &[Point]) -> io::Result<()> {
        write_json(&self.dir, POINTS_FILE, &points).await
    }

    pub async fn load_map(&self) -> io::Result<MapSnapshot> {
        match read_json::<serde_json::Value>(&self.dir.join(MAP_FILE)).await? {
            Some(value) => MapSnapshot::from_value(value)
                .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e)),
            None => Ok(MapSnapshot::default()),
        }
    }

    pub async fn save_map(&self, map: &MapSnapshot) -> io::Result<()> {
        write_json(&self.dir, MAP_FILE, map).await
    }

    pub async fn load_stats(&self) -> io::Result<NavigationStats> {
        Ok(read_json(&self.dir.join(STATS_FILE)).await?.unwrap_or_default())
    }

    pub async fn save_stats(&self, stats: &NavigationStats) -> io::Result<()> {
        write_json(&self.dir, STATS_FILE, stats).await
    }
}

/// `Ok(None)` when the file does not exist.
async fn read_json<T: DeserializeOwned>(path: &Path) -> io::Result<Option<T>> {
    let raw = match tokio::fs::read(path).await {
        Ok(raw) => raw,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e),
    };
    serde_json::from_slice(&raw)
        .map(Some)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
}

/// Write through a temp file and rename so readers never see a torn file.
async fn write_json<T: Serialize + ?Sized>(dir: &Path, name: &str, value: &T) -> io::Result<()> {
    tokio::fs::create_dir_all(dir).await?;
    let json = serde_json::to_vec_pretty(value)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    let tmp = dir.join(format!(".{name}.tmp"));
    tokio::fs::write(&tmp, json).await?;
    tokio::fs::rename(&tmp, dir.join(name)).await
}
