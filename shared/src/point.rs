use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Kind of place a point marks. Unknown strings load as `Other`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Classroom,
    Entrance,
    Exit,
    Toilet,
    #[serde(alias = "staircase")]
    Stair,
    Elevator,
    Cafeteria,
    Hall,
    Library,
    Gym,
    Office,
    Medical,
    #[default]
    #[serde(other)]
    Other,
}

impl Category {
    pub const ALL: [Category; 13] = [
        Category::Classroom,
        Category::Entrance,
        Category::Exit,
        Category::Toilet,
        Category::Stair,
        Category::Elevator,
        Category::Cafeteria,
        Category::Hall,
        Category::Library,
        Category::Gym,
        Category::Office,
        Category::Medical,
        Category::Other,
    ];

    /// Only stairs bridge floors when building a route.
    pub fn is_vertical_link(self) -> bool {
        matches!(self, Category::Stair)
    }

    pub fn label(self) -> &'static str {
        match self {
            Category::Classroom => "Classroom",
            Category::Entrance => "Entrance",
            Category::Exit => "Exit",
            Category::Toilet => "Restroom",
            Category::Stair => "Stairs",
            Category::Elevator => "Elevator",
            Category::Cafeteria => "Cafeteria",
            Category::Hall => "Hall",
            Category::Library => "Library",
            Category::Gym => "Gym",
            Category::Office => "Office",
            Category::Medical => "Medical",
            Category::Other => "Other",
        }
    }
}

/// A point of interest in floor-local world coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub id: String,
    pub name: String,
    pub x: f64,
    pub y: f64,
    pub floor: i32,
    #[serde(default)]
    pub category: Category,
    #[serde(default)]
    pub description: String,
}

impl Point {
    pub fn distance_to(&self, other: &Point) -> f64 {
        self.distance_to_xy(other.x, other.y)
    }

    pub fn distance_to_xy(&self, x: f64, y: f64) -> f64 {
        (self.x - x).hypot(self.y - y)
    }

    /// Case-insensitive substring match on name or description.
    pub fn matches_query(&self, query_lower: &str) -> bool {
        self.name.to_lowercase().contains(query_lower)
            || self.description.to_lowercase().contains(query_lower)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuplicateId(pub String);

impl fmt::Display for DuplicateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "duplicate point id: {}", self.0)
    }
}

impl std::error::Error for DuplicateId {}

pub fn validate_unique_ids(points: &[Point]) -> Result<(), DuplicateId> {
    let mut seen = HashSet::with_capacity(points.len());
    for point in points {
        if !seen.insert(point.id.as_str()) {
            return Err(DuplicateId(point.id.clone()));
        }
    }
    Ok(())
}

/// Search over points in their canonical order, capped at `limit` results.
pub fn search_points<'a>(
    points: &'a [Point],
    query: &str,
    min_chars: usize,
    limit: usize,
) -> Vec<&'a Point> {
    let query = query.trim().to_lowercase();
    if query.chars().count() < min_chars {
        return Vec::new();
    }
    points
        .iter()
        .filter(|p| p.matches_query(&query))
        .take(limit)
        .collect()
}

#[cfg(test)]
pub(crate) fn test_point(id: &str, x: f64, y: f64, floor: i32, category: Category) -> Point {
    Point {
        id: id.to_string(),
        name: id.to_string(),
        x,
        y,
        floor,
        category,
        description: String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_parses_lowercase_and_aliases() {
        let parsed: Vec<Category> =
            serde_json::from_str(r#"["classroom","staircase","stair","toilet","mystery"]"#)
                .expect("parse categories");
        assert_eq!(
            parsed,
            vec![
                Category::Classroom,
                Category::Stair,
                Category::Stair,
                Category::Toilet,
                Category::Other,
            ]
        );
    }

    #[test]
    fn point_without_description_or_category_loads() {
        let point: Point =
            serde_json::from_str(r#"{"id":"a","name":"A","x":1.5,"y":2,"floor":1}"#)
                .expect("parse point");
        assert_eq!(point.category, Category::Other);
        assert!(point.description.is_empty());
        assert_eq!(point.y, 2.0);
    }

    #[test]
    fn only_stairs_link_floors() {
        assert!(Category::Stair.is_vertical_link());
        assert!(!Category::Elevator.is_vertical_link());
        assert!(!Category::Hall.is_vertical_link());
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let points = vec![
            test_point("a", 0.0, 0.0, 1, Category::Hall),
            test_point("b", 0.0, 0.0, 1, Category::Hall),
            test_point("a", 5.0, 5.0, 2, Category::Hall),
        ];
        assert_eq!(
            validate_unique_ids(&points),
            Err(DuplicateId("a".to_string()))
        );
        assert!(validate_unique_ids(&points[..2]).is_ok());
    }

    #[test]
    fn search_requires_min_chars_and_caps_results() {
        let mut points: Vec<Point> = (0..30)
            .map(|i| test_point(&format!("room_{i}"), 0.0, 0.0, 1, Category::Classroom))
            .collect();
        points[3].description = "Near the LIBRARY".to_string();

        assert!(search_points(&points, "r", 2, 20).is_empty());
        assert_eq!(search_points(&points, "ROOM", 2, 20).len(), 20);

        let hits = search_points(&points, "library", 2, 20);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, "room_3");
    }
}
