use std::fmt;

use wayfinder_shared::{DuplicateId, RouteError};

/// Everything that can go wrong in the map widget. None of these are fatal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MapError {
    /// A route was requested without both endpoints.
    NoEndpoints,
    /// The route source returned no waypoints.
    EmptyRoute,
    /// A fetch failed; previous data stays in place.
    Network(String),
    /// A floor's background could not be loaded.
    FloorAssetMissing(i32),
    /// Data arrived but was rejected (e.g. duplicate point ids).
    InvalidData(String),
}

impl MapError {
    /// Shown as a blocking prompt instead of a toast.
    pub fn is_blocking(&self) -> bool {
        matches!(self, MapError::NoEndpoints)
    }
}

impl fmt::Display for MapError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MapError::NoEndpoints => write!(f, "Choose a start and a destination first"),
            MapError::EmptyRoute => write!(f, "Route not found"),
            MapError::Network(detail) => write!(f, "Network error: {detail}"),
            MapError::FloorAssetMissing(floor) => write!(f, "Floor {floor} plan is unavailable"),
            MapError::InvalidData(detail) => write!(f, "Invalid map data: {detail}"),
        }
    }
}

impl std::error::Error for MapError {}

impl From<RouteError> for MapError {
    fn from(err: RouteError) -> Self {
        match err {
            RouteError::NoEndpoints => MapError::NoEndpoints,
            RouteError::EmptyRoute => MapError::EmptyRoute,
        }
    }
}

impl From<DuplicateId> for MapError {
    fn from(err: DuplicateId) -> Self {
        MapError::InvalidData(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn route_errors_map_onto_widget_errors() {
        assert_eq!(MapError::from(RouteError::NoEndpoints), MapError::NoEndpoints);
        assert_eq!(MapError::from(RouteError::EmptyRoute), MapError::EmptyRoute);
        assert!(MapError::NoEndpoints.is_blocking());
        assert!(!MapError::Network("HTTP 500".into()).is_blocking());
    }

    #[test]
    fn duplicate_ids_are_invalid_data() {
        let err = MapError::from(DuplicateId("stair_1".into()));
        assert_eq!(err.to_string(), "Invalid map data: duplicate point id: stair_1");
    }
}
