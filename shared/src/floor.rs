use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::colors::room_color;

pub const DEFAULT_FLOORS: [i32; 3] = [1, 2, 3];

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Wall {
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Room {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

impl Room {
    /// Hex fill color; rooms authored without one get a stable palette entry.
    pub fn fill_hex(&self) -> String {
        match &self.color {
            Some(color) => color.clone(),
            None => room_color(&self.name).to_string(),
        }
    }

    pub fn center(&self) -> (f64, f64) {
        (self.x + self.width / 2.0, self.y + self.height / 2.0)
    }
}

/// Doorway marker centered on a wall gap.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Door {
    pub x: f64,
    pub y: f64,
}

/// Decorative geometry for one floor. Never consulted by routing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Floor {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default)]
    pub walls: Vec<Wall>,
    #[serde(default)]
    pub rooms: Vec<Room>,
    #[serde(default)]
    pub doors: Vec<Door>,
}

impl Floor {
    pub fn has_geometry(&self) -> bool {
        !self.walls.is_empty() || !self.rooms.is_empty() || !self.doors.is_empty()
    }

    /// World-space bounding box of walls, rooms and doors.
    pub fn bounds(&self) -> Option<(f64, f64, f64, f64)> {
        let mut bounds: Option<(f64, f64, f64, f64)> = None;
        let mut include = |x: f64, y: f64| {
            bounds = Some(match bounds {
                None => (x, y, x, y),
                Some((min_x, min_y, max_x, max_y)) => {
                    (min_x.min(x), min_y.min(y), max_x.max(x), max_y.max(y))
                }
            });
        };
        for wall in &self.walls {
            include(wall.x1, wall.y1);
            include(wall.x2, wall.y2);
        }
        for room in &self.rooms {
            include(room.x, room.y);
            include(room.x + room.width, room.y + room.height);
        }
        for door in &self.doors {
            include(door.x, door.y);
        }
        bounds
    }
}

/// Whole-building geometry keyed by floor index (`{"floors": {"1": {...}}}`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapData {
    #[serde(default)]
    pub floors: BTreeMap<i32, Floor>,
}

impl Default for MapData {
    fn default() -> Self {
        Self {
            floors: DEFAULT_FLOORS
                .iter()
                .map(|&index| (index, Floor::default()))
                .collect(),
        }
    }
}

impl MapData {
    pub fn floor(&self, index: i32) -> Option<&Floor> {
        self.floors.get(&index)
    }

    pub fn floor_indices(&self) -> Vec<i32> {
        self.floors.keys().copied().collect()
    }
}
