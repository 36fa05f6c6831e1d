//! Wire types shared by the HTTP server and the browser client.

use serde::{Deserialize, Serialize};

use crate::point::{Category, Point};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NavigateRequest {
    #[serde(default)]
    pub start_id: Option<String>,
    #[serde(default)]
    pub end_id: Option<String>,
}

/// Server-computed path plus rounded metrics (`distance` in meters, `time` in minutes).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NavigateResponse {
    pub path: Vec<Point>,
    pub distance: f64,
    pub time: u32,
}

/// Compact point projection returned by `/api/search`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub category: Category,
    pub floor: i32,
}

impl From<&Point> for SearchHit {
    fn from(point: &Point) -> Self {
        Self {
            id: point.id.clone(),
            name: point.name.clone(),
            category: point.category,
            floor: point.floor,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

impl ErrorBody {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuccessBody {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub point: Option<Point>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn navigate_request_tolerates_missing_fields() {
        let req: NavigateRequest = serde_json::from_str(r#"{"start_id":"a"}"#).expect("parse");
        assert_eq!(req.start_id.as_deref(), Some("a"));
        assert!(req.end_id.is_none());
    }

    #[test]
    fn search_hit_serializes_lowercase_category() {
        let point = Point {
            id: "stair_1".to_string(),
            name: "Stairs".to_string(),
            x: 1.0,
            y: 2.0,
            floor: 1,
            category: Category::Stair,
            description: String::new(),
        };
        let value = serde_json::to_value(SearchHit::from(&point)).expect("encode");
        assert_eq!(value["category"], "stair");
        assert_eq!(value["floor"], 1);
        assert!(value.get("x").is_none());
    }
}
