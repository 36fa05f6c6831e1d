//! Floor-aware route construction.
//!
//! Routes are waypoint sequences, not graph searches: a route between two
//! floors is bridged by the first stair found on each floor, in point-set
//! order. Both the browser (local routing) and the server `/api/navigate`
//! endpoint run this same builder over their own point set.

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::point::Point;

pub const DEFAULT_METERS_PER_UNIT: f64 = 0.5;
pub const DEFAULT_WALK_SPEED_M_PER_MIN: f64 = 70.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RouteParams {
    pub meters_per_unit: f64,
    pub walk_speed_m_per_min: f64,
}

impl Default for RouteParams {
    fn default() -> Self {
        Self {
            meters_per_unit: DEFAULT_METERS_PER_UNIT,
            walk_speed_m_per_min: DEFAULT_WALK_SPEED_M_PER_MIN,
        }
    }
}

impl RouteParams {
    pub fn with_walk_speed(mut self, walk_speed_m_per_min: f64) -> Self {
        if walk_speed_m_per_min.is_finite() && walk_speed_m_per_min > 0.0 {
            self.walk_speed_m_per_min = walk_speed_m_per_min;
        }
        self
    }

    pub fn meters(&self, distance_units: f64) -> f64 {
        (distance_units * self.meters_per_unit).round()
    }

    pub fn eta_minutes(&self, meters: f64) -> u32 {
        let minutes = (meters / self.walk_speed_m_per_min).round();
        if minutes.is_finite() && minutes >= 1.0 {
            minutes as u32
        } else {
            1
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteError {
    /// Start or end was not selected.
    NoEndpoints,
    /// A path source produced no waypoints.
    EmptyRoute,
}

impl fmt::Display for RouteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RouteError::NoEndpoints => write!(f, "select both a start and a destination"),
            RouteError::EmptyRoute => write!(f, "route not found"),
        }
    }
}

impl std::error::Error for RouteError {}

#[derive(Debug, Clone, PartialEq)]
pub enum RouteStep {
    WalkTo { from: String, to: String },
    FloorChange { from: String, to: String, to_floor: i32 },
}

impl RouteStep {
    pub fn describe(&self, points: &[Point]) -> String {
        let name_of = |id: &str| {
            points
                .iter()
                .find(|p| p.id == id)
                .map(|p| p.name.clone())
                .unwrap_or_else(|| id.to_string())
        };
        match self {
            RouteStep::WalkTo { to, .. } => format!("Walk to {}", name_of(to)),
            RouteStep::FloorChange { to_floor, .. } => format!("Go to floor {to_floor}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Route {
    pub waypoints: Vec<Point>,
    pub distance_units: f64,
    pub total_distance_meters: f64,
    pub eta_minutes: u32,
    pub steps: Vec<RouteStep>,
}

impl Route {
    /// Builds a route from an ordered waypoint list, dropping repeated ids.
    pub fn from_waypoints(waypoints: Vec<Point>, params: &RouteParams) -> Result<Self, RouteError> {
        let mut seen = HashSet::with_capacity(waypoints.len());
        let waypoints: Vec<Point> = waypoints
            .into_iter()
            .filter(|p| seen.insert(p.id.clone()))
            .collect();
        if waypoints.is_empty() {
            return Err(RouteError::EmptyRoute);
        }

        let distance_units: f64 = waypoints
            .windows(2)
            .map(|pair| pair[0].distance_to(&pair[1]))
            .sum();
        let total_distance_meters = params.meters(distance_units);
        let eta_minutes = params.eta_minutes(total_distance_meters);
        let steps = waypoints
            .windows(2)
            .map(|pair| {
                let (from, to) = (&pair[0], &pair[1]);
                if from.floor != to.floor {
                    RouteStep::FloorChange {
                        from: from.id.clone(),
                        to: to.id.clone(),
                        to_floor: to.floor,
                    }
                } else {
                    RouteStep::WalkTo {
                        from: from.id.clone(),
                        to: to.id.clone(),
                    }
                }
            })
            .collect();

        Ok(Self {
            waypoints,
            distance_units,
            total_distance_meters,
            eta_minutes,
            steps,
        })
    }

    pub fn start(&self) -> Option<&Point> {
        self.waypoints.first()
    }

    pub fn end(&self) -> Option<&Point> {
        self.waypoints.last()
    }

    pub fn floor_changes(&self) -> usize {
        self.steps
            .iter()
            .filter(|step| matches!(step, RouteStep::FloorChange { .. }))
            .count()
    }

    /// Waypoints on one floor, in traversal order.
    pub fn waypoints_on_floor(&self, floor: i32) -> Vec<&Point> {
        self.waypoints.iter().filter(|p| p.floor == floor).collect()
    }
}

fn first_stair_on(points: &[Point], floor: i32) -> Option<&Point> {
    points
        .iter()
        .find(|p| p.floor == floor && p.category.is_vertical_link())
}

/// Builds `[start, stair(start.floor)?, stair(end.floor)?, end]`.
///
/// A floor without a stair contributes no link. Fails only when an endpoint
/// is missing.
pub fn build_route(
    start: Option<&Point>,
    end: Option<&Point>,
    points: &[Point],
    params: &RouteParams,
) -> Result<Route, RouteError> {
    let (Some(start), Some(end)) = (start, end) else {
        return Err(RouteError::NoEndpoints);
    };

    let mut waypoints = vec![start.clone()];
    if start.floor != end.floor {
        waypoints.extend(first_stair_on(points, start.floor).cloned());
        waypoints.extend(first_stair_on(points, end.floor).cloned());
    }
    waypoints.push(end.clone());

    Route::from_waypoints(waypoints, params)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::point::{Category, test_point};

    fn scenario_points() -> Vec<Point> {
        vec![
            test_point("A", 0.0, 0.0, 1, Category::Classroom),
            test_point("S1", 10.0, 0.0, 1, Category::Stair),
            test_point("S2", 10.0, 0.0, 2, Category::Stair),
            test_point("B", 0.0, 0.0, 2, Category::Classroom),
        ]
    }

    fn ids(route: &Route) -> Vec<&str> {
        route.waypoints.iter().map(|p| p.id.as_str()).collect()
    }

    #[test]
    fn cross_floor_route_goes_through_both_stairs() {
        let points = scenario_points();
        let route = build_route(
            Some(&points[0]),
            Some(&points[3]),
            &points,
            &RouteParams::default(),
        )
        .expect("route");

        assert_eq!(ids(&route), vec!["A", "S1", "S2", "B"]);
        assert_eq!(route.distance_units, 20.0);
        assert_eq!(route.total_distance_meters, 10.0);
        assert_eq!(route.eta_minutes, 1);
        assert_eq!(route.floor_changes(), 1);
        assert_eq!(
            route.steps[1],
            RouteStep::FloorChange {
                from: "S1".to_string(),
                to: "S2".to_string(),
                to_floor: 2,
            }
        );
    }

    #[test]
    fn same_floor_route_is_start_then_end() {
        let points = scenario_points();
        let route = build_route(
            Some(&points[2]),
            Some(&points[3]),
            &points,
            &RouteParams::default(),
        )
        .expect("route");
        assert_eq!(ids(&route), vec!["S2", "B"]);
        assert_eq!(
            route.steps,
            vec![RouteStep::WalkTo {
                from: "S2".to_string(),
                to: "B".to_string(),
            }]
        );
    }

    #[test]
    fn missing_stair_on_start_floor_is_skipped() {
        let points = vec![
            test_point("A", 0.0, 0.0, 1, Category::Classroom),
            test_point("S2", 10.0, 0.0, 2, Category::Stair),
            test_point("B", 0.0, 0.0, 2, Category::Classroom),
        ];
        let route = build_route(
            Some(&points[0]),
            Some(&points[2]),
            &points,
            &RouteParams::default(),
        )
        .expect("route without start stair");
        assert_eq!(ids(&route), vec!["A", "S2", "B"]);
    }

    #[test]
    fn start_that_is_a_stair_collapses() {
        let points = scenario_points();
        let route = build_route(
            Some(&points[1]),
            Some(&points[3]),
            &points,
            &RouteParams::default(),
        )
        .expect("route");
        assert_eq!(ids(&route), vec!["S1", "S2", "B"]);
    }

    #[test]
    fn first_stair_in_point_order_wins() {
        let mut points = scenario_points();
        points.insert(0, test_point("S0", 99.0, 0.0, 1, Category::Stair));
        points.push(test_point("E", 1.0, 1.0, 1, Category::Elevator));
        let route = build_route(
            Some(&points[1]),
            Some(&points[4]),
            &points,
            &RouteParams::default(),
        )
        .expect("route");
        assert_eq!(ids(&route), vec!["A", "S0", "S2", "B"]);
    }

    #[test]
    fn missing_endpoint_is_an_error() {
        let points = scenario_points();
        let params = RouteParams::default();
        assert_eq!(
            build_route(Some(&points[0]), None, &points, &params),
            Err(RouteError::NoEndpoints)
        );
        assert_eq!(
            build_route(None, Some(&points[0]), &points, &params),
            Err(RouteError::NoEndpoints)
        );
    }

    #[test]
    fn empty_waypoint_list_is_empty_route() {
        assert_eq!(
            Route::from_waypoints(Vec::new(), &RouteParams::default()),
            Err(RouteError::EmptyRoute)
        );
    }

    #[test]
    fn duplicates_anywhere_keep_first_occurrence() {
        let points = scenario_points();
        let waypoints = vec![
            points[0].clone(),
            points[1].clone(),
            points[0].clone(),
            points[3].clone(),
        ];
        let route = Route::from_waypoints(waypoints, &RouteParams::default()).expect("route");
        assert_eq!(ids(&route), vec!["A", "S1", "B"]);
    }

    #[test]
    fn intermediate_waypoints_never_shorten_the_route() {
        let start = test_point("s", 3.0, 4.0, 1, Category::Hall);
        let end = test_point("e", 40.0, -7.0, 2, Category::Hall);
        let direct = start.distance_to(&end);
        let detours = [(0.0, 0.0), (20.0, 0.0), (100.0, 50.0), (21.5, -1.5)];
        for (i, (x, y)) in detours.into_iter().enumerate() {
            let stair = test_point(&format!("st{i}"), x, y, 1, Category::Stair);
            let route = build_route(
                Some(&start),
                Some(&end),
                &[stair],
                &RouteParams::default(),
            )
            .expect("route");
            assert!(route.distance_units + 1e-9 >= direct);
        }
    }

    #[test]
    fn eta_is_at_least_one_minute_and_uses_walk_speed() {
        let params = RouteParams::default().with_walk_speed(80.0);
        assert_eq!(params.eta_minutes(0.0), 1);
        assert_eq!(params.eta_minutes(400.0), 5);
        assert_eq!(RouteParams::default().eta_minutes(350.0), 5);
        assert_eq!(RouteParams::default().with_walk_speed(-1.0).walk_speed_m_per_min, 70.0);
    }

    #[test]
    fn waypoints_on_floor_keeps_order() {
        let points = scenario_points();
        let route = build_route(
            Some(&points[0]),
            Some(&points[3]),
            &points,
            &RouteParams::default(),
        )
        .expect("route");
        let floor_two: Vec<&str> = route
            .waypoints_on_floor(2)
            .iter()
            .map(|p| p.id.as_str())
            .collect();
        assert_eq!(floor_two, vec!["S2", "B"]);
    }

    #[test]
    fn step_descriptions_use_point_names() {
        let points = scenario_points();
        let walk = RouteStep::WalkTo {
            from: "A".to_string(),
            to: "S1".to_string(),
        };
        assert_eq!(walk.describe(&points), "Walk to S1");
        let change = RouteStep::FloorChange {
            from: "S1".to_string(),
            to: "S2".to_string(),
            to_floor: 2,
        };
        assert_eq!(change.describe(&points), "Go to floor 2");
    }
}
