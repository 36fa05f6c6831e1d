use std::collections::HashMap;

use wayfinder_shared::{MapData, Point, Route, build_route};

use crate::assets::AssetStatus;
use crate::config::EngineConfig;
use crate::error::MapError;
use crate::input::{InputController, InputOutcome};
use crate::renderer::{DrawList, SceneSnapshot, render};
use crate::spatial::PointIndex;
use crate::theme::Theme;
use crate::viewport::Viewport;

/// Point ids the user has picked or is pointing at.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    pub selected: Option<String>,
    pub hovered: Option<String>,
    pub start: Option<String>,
    pub end: Option<String>,
}

/// Owns all map state for one widget: viewport, points, floors, selection
/// and the current route. UI panels hold a handle to this and call its
/// methods; nothing here touches the DOM.
#[derive(Debug, Clone)]
pub struct MapEngine {
    config: EngineConfig,
    theme: Theme,
    viewport: Viewport,
    index: PointIndex,
    map: MapData,
    assets: HashMap<i32, AssetStatus>,
    selection: Selection,
    route: Option<Route>,
    input: InputController,
    surface: (f64, f64),
    current_floor: i32,
    view_initialized: bool,
}

impl MapEngine {
    pub fn new(config: EngineConfig, theme: Theme) -> Self {
        let viewport = Viewport::new(config.min_scale, config.max_scale);
        let input = InputController::new(config.wheel_zoom_in, config.wheel_zoom_out);
        Self {
            config,
            theme,
            viewport,
            index: PointIndex::default(),
            map: MapData::default(),
            assets: HashMap::new(),
            selection: Selection::default(),
            route: None,
            input,
            surface: (0.0, 0.0),
            current_floor: 1,
            view_initialized: false,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn theme(&self) -> &Theme {
        &self.theme
    }

    pub fn set_theme(&mut self, theme: Theme) {
        self.theme = theme;
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn current_floor(&self) -> i32 {
        self.current_floor
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn route(&self) -> Option<&Route> {
        self.route.as_ref()
    }

    pub fn points(&self) -> &[Point] {
        self.index.all()
    }

    pub fn point(&self, id: &str) -> Option<&Point> {
        self.index.get(id)
    }

    pub fn map(&self) -> &MapData {
        &self.map
    }

    /// Floors known from geometry or points, ascending.
    pub fn floors(&self) -> Vec<i32> {
        let mut floors = self.map.floor_indices();
        floors.extend(self.index.floors());
        floors.sort_unstable();
        floors.dedup();
        floors
    }

    /// Replace the point set wholesale. On rejection the old set is kept.
    /// Any route is dropped: its waypoints are copies of the old set.
    pub fn set_points(&mut self, points: Vec<Point>) -> Result<(), MapError> {
        self.index = PointIndex::build(points)?;
        let index = &self.index;
        let keep = |slot: &mut Option<String>| {
            if slot.as_deref().is_some_and(|id| index.get(id).is_none()) {
                *slot = None;
            }
        };
        keep(&mut self.selection.selected);
        keep(&mut self.selection.hovered);
        keep(&mut self.selection.start);
        keep(&mut self.selection.end);
        self.route = None;
        Ok(())
    }

    pub fn set_map(&mut self, map: MapData) {
        self.map = map;
    }

    /// Returns true when the view was reset for the first usable size.
    pub fn set_surface_size(&mut self, width: f64, height: f64) -> bool {
        self.surface = (width, height);
        if !self.view_initialized && width > 0.0 && height > 0.0 {
            self.view_initialized = true;
            self.viewport.reset(width, height);
            return true;
        }
        false
    }

    pub fn surface_size(&self) -> (f64, f64) {
        self.surface
    }

    pub fn change_floor(&mut self, floor: i32) -> bool {
        if floor == self.current_floor {
            return false;
        }
        self.current_floor = floor;
        self.input.clear_hover();
        self.selection.hovered = None;
        true
    }

    pub fn select(&mut self, id: Option<String>) {
        self.selection.selected = id.filter(|id| self.index.get(id).is_some());
    }

    pub fn selected_point(&self) -> Option<&Point> {
        self.selection.selected.as_deref().and_then(|id| self.index.get(id))
    }

    pub fn start_point(&self) -> Option<&Point> {
        self.selection.start.as_deref().and_then(|id| self.index.get(id))
    }

    pub fn end_point(&self) -> Option<&Point> {
        self.selection.end.as_deref().and_then(|id| self.index.get(id))
    }

    /// A changed endpoint invalidates the current route.
    pub fn set_start(&mut self, id: &str) -> bool {
        if self.index.get(id).is_none() {
            return false;
        }
        if self.selection.start.as_deref() != Some(id) {
            self.selection.start = Some(id.to_string());
            self.route = None;
        }
        true
    }

    pub fn set_end(&mut self, id: &str) -> bool {
        if self.index.get(id).is_none() {
            return false;
        }
        if self.selection.end.as_deref() != Some(id) {
            self.selection.end = Some(id.to_string());
            self.route = None;
        }
        true
    }

    pub fn clear_start(&mut self) {
        self.selection.start = None;
        self.route = None;
    }

    pub fn clear_end(&mut self) {
        self.selection.end = None;
        self.route = None;
    }

    pub fn swap_endpoints(&mut self) {
        if self.selection.start == self.selection.end {
            return;
        }
        std::mem::swap(&mut self.selection.start, &mut self.selection.end);
        self.route = None;
    }

    /// Ids for a server-side route request.
    pub fn endpoint_ids(&self) -> Result<(String, String), MapError> {
        match (&self.selection.start, &self.selection.end) {
            (Some(start), Some(end)) => Ok((start.clone(), end.clone())),
            _ => Err(MapError::NoEndpoints),
        }
    }

    /// Route over the local point set. Shows the start floor on success.
    pub fn build_local_route(&mut self) -> Result<&Route, MapError> {
        let route = build_route(
            self.start_point(),
            self.end_point(),
            self.index.all(),
            &self.config.route,
        )?;
        Ok(self.install_route(route))
    }

    /// Route from an externally computed path (server strategy).
    pub fn apply_route(&mut self, path: Vec<Point>) -> Result<&Route, MapError> {
        match Route::from_waypoints(path, &self.config.route) {
            Ok(route) => Ok(self.install_route(route)),
            Err(err) => {
                self.route = None;
                Err(err.into())
            }
        }
    }

    fn install_route(&mut self, route: Route) -> &Route {
        if let Some(start) = route.start() {
            let floor = start.floor;
            self.change_floor(floor);
        }
        self.route.insert(route)
    }

    pub fn clear_route(&mut self) {
        self.route = None;
    }

    /// Record a failed route request. A missing route leaves nothing drawn;
    /// other failures keep whatever was shown before.
    pub fn fail_route(&mut self, err: MapError) -> MapError {
        if err == MapError::EmptyRoute {
            self.route = None;
        }
        err
    }

    /// Switch to the point's floor and center it, keeping the zoom level.
    pub fn center_on_point(&mut self, id: &str) -> bool {
        let Some((x, y, floor)) = self.index.get(id).map(|p| (p.x, p.y, p.floor)) else {
            return false;
        };
        self.change_floor(floor);
        self.viewport.center_on(x, y, self.surface.0, self.surface.1);
        true
    }

    pub fn zoom_in(&mut self) {
        self.zoom_about_center(self.config.button_zoom);
    }

    pub fn zoom_out(&mut self) {
        self.zoom_about_center(1.0 / self.config.button_zoom);
    }

    fn zoom_about_center(&mut self, factor: f64) {
        let (w, h) = self.surface;
        self.viewport.zoom_at(w / 2.0, h / 2.0, factor);
    }

    pub fn reset_view(&mut self) {
        self.viewport.reset(self.surface.0, self.surface.1);
    }

    /// Fit the current floor's geometry, falling back to its points.
    pub fn fit_floor(&mut self) -> bool {
        let bounds = self
            .map
            .floor(self.current_floor)
            .and_then(|floor| floor.bounds())
            .or_else(|| {
                self.index.on_floor(self.current_floor).fold(None, |acc, p| {
                    Some(match acc {
                        None => (p.x, p.y, p.x, p.y),
                        Some((a, b, c, d)) => (
                            f64::min(a, p.x),
                            f64::min(b, p.y),
                            f64::max(c, p.x),
                            f64::max(d, p.y),
                        ),
                    })
                })
            });
        let Some((min_x, min_y, max_x, max_y)) = bounds else {
            return false;
        };
        let before = self.viewport.clone();
        self.viewport
            .fit_bounds(min_x, min_y, max_x, max_y, self.surface.0, self.surface.1);
        self.viewport != before
    }

    pub fn relocate_point(&mut self, id: &str, x: f64, y: f64) -> Option<Point> {
        let moved = self.index.relocate(id, x, y)?;
        if let Some(route) = self.route.as_mut() {
            for waypoint in route.waypoints.iter_mut().filter(|w| w.id == moved.id) {
                waypoint.x = moved.x;
                waypoint.y = moved.y;
            }
        }
        Some(moved)
    }

    pub fn floor_asset(&self, floor: i32) -> AssetStatus {
        self.assets.get(&floor).copied().unwrap_or_default()
    }

    pub fn mark_floor_asset(&mut self, floor: i32, status: AssetStatus) {
        self.assets.insert(floor, status);
    }

    fn hit_at(&self, sx: f64, sy: f64, threshold_px: f64) -> Option<String> {
        hit_test(&self.viewport, &self.index, self.current_floor, sx, sy, threshold_px)
    }

    pub fn pointer_down(&mut self, sx: f64, sy: f64) -> InputOutcome {
        let hit = self.hit_at(sx, sy, self.config.click_threshold_px);
        let outcome = self.input.pointer_down(sx, sy, hit.as_deref());
        self.apply(&outcome);
        outcome
    }

    pub fn pointer_move(&mut self, sx: f64, sy: f64) -> InputOutcome {
        let (viewport, index, floor) = (&self.viewport, &self.index, self.current_floor);
        let threshold = self.config.hit_threshold_px;
        let outcome = self
            .input
            .pointer_move(sx, sy, || hit_test(viewport, index, floor, sx, sy, threshold));
        self.apply(&outcome);
        outcome
    }

    pub fn pointer_up(&mut self) -> bool {
        self.input.pointer_up()
    }

    pub fn pointer_leave(&mut self) -> InputOutcome {
        let outcome = self.input.pointer_leave();
        self.apply(&outcome);
        outcome
    }

    pub fn wheel(&mut self, delta_y: f64, sx: f64, sy: f64) -> InputOutcome {
        let outcome = self.input.wheel(delta_y, sx, sy);
        self.apply(&outcome);
        outcome
    }

    pub fn is_dragging(&self) -> bool {
        self.input.is_dragging()
    }

    fn apply(&mut self, outcome: &InputOutcome) {
        match outcome {
            InputOutcome::None => {}
            InputOutcome::Select(id) => self.select(Some(id.clone())),
            InputOutcome::Pan { dx, dy } => self.viewport.pan(*dx, *dy),
            InputOutcome::Hover(id) => self.selection.hovered = id.clone(),
            InputOutcome::Zoom {
                screen_x,
                screen_y,
                factor,
            } => self.viewport.zoom_at(*screen_x, *screen_y, *factor),
        }
    }

    pub fn scene(&self) -> DrawList {
        render(&SceneSnapshot {
            viewport: &self.viewport,
            surface: self.surface,
            floor: self.current_floor,
            geometry: self.map.floor(self.current_floor),
            floor_asset: self.floor_asset(self.current_floor),
            points: self.index.all(),
            selection: &self.selection,
            route: self.route.as_ref(),
            theme: &self.theme,
            config: &self.config,
        })
    }
}

/// Nearest point under a screen position. The threshold stays constant in
/// screen pixels at every zoom level.
fn hit_test(
    viewport: &Viewport,
    index: &PointIndex,
    floor: i32,
    sx: f64,
    sy: f64,
    threshold_px: f64,
) -> Option<String> {
    let (wx, wy) = viewport.to_world(sx, sy);
    index
        .nearest(floor, wx, wy, threshold_px / viewport.scale)
        .map(|p| p.id.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use wayfinder_shared::Category;

    fn point(id: &str, x: f64, y: f64, floor: i32, category: Category) -> Point {
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

    fn engine() -> MapEngine {
        let mut engine = MapEngine::new(EngineConfig::default(), Theme::classic());
        engine
            .set_points(vec![
                point("A", 0.0, 0.0, 1, Category::Classroom),
                point("S1", 10.0, 0.0, 1, Category::Stair),
                point("S2", 10.0, 0.0, 2, Category::Stair),
                point("B", 0.0, 0.0, 2, Category::Classroom),
            ])
            .expect("unique ids");
        engine.set_surface_size(800.0, 600.0);
        engine
    }

    fn ids(route: &Route) -> Vec<&str> {
        route.waypoints.iter().map(|p| p.id.as_str()).collect()
    }

    #[test]
    fn building_without_endpoints_fails_and_keeps_state() {
        let mut engine = engine();
        engine.set_start("A");
        assert_eq!(engine.build_local_route().err(), Some(MapError::NoEndpoints));
        assert!(engine.route().is_none());
        assert_eq!(engine.endpoint_ids(), Err(MapError::NoEndpoints));
    }

    #[test]
    fn local_route_switches_to_start_floor() {
        let mut engine = engine();
        engine.set_start("B");
        engine.set_end("A");
        engine.change_floor(1);
        let route = engine.build_local_route().expect("route");
        assert_eq!(ids(route), vec!["B", "S2", "S1", "A"]);
        assert_eq!(engine.current_floor(), 2);
    }

    #[test]
    fn clearing_an_endpoint_clears_the_route() {
        let mut engine = engine();
        engine.set_start("A");
        engine.set_end("B");
        engine.build_local_route().expect("route");
        engine.clear_end();
        assert!(engine.route().is_none());
        assert_eq!(engine.selection().end, None);
    }

    #[test]
    fn empty_server_path_is_an_empty_route() {
        let mut engine = engine();
        engine.set_start("A");
        engine.set_end("B");
        engine.build_local_route().expect("route");
        assert_eq!(engine.apply_route(Vec::new()).err(), Some(MapError::EmptyRoute));
        assert!(engine.route().is_none());
    }

    #[test]
    fn server_path_becomes_route_with_local_metrics() {
        let mut engine = engine();
        let path = vec![
            point("A", 0.0, 0.0, 1, Category::Classroom),
            point("B", 0.0, 0.0, 2, Category::Classroom),
        ];
        let route = engine.apply_route(path).expect("route");
        assert_eq!(route.distance_units, 0.0);
        assert_eq!(route.eta_minutes, 1);
        assert_eq!(route.floor_changes(), 1);
    }

    #[test]
    fn reloading_points_drops_route_built_from_old_copies() {
        let mut engine = engine();
        engine.set_start("A");
        engine.set_end("B");
        engine.build_local_route().expect("route");
        engine
            .set_points(vec![
                point("A", 0.0, 0.0, 1, Category::Classroom),
                point("B", 500.0, 0.0, 2, Category::Classroom),
            ])
            .expect("unique ids");
        assert_eq!(engine.selection().start.as_deref(), Some("A"));
        assert_eq!(engine.selection().end.as_deref(), Some("B"));
        assert!(engine.route().is_none());

        let route = engine.build_local_route().expect("rebuilt");
        assert_eq!(ids(route), vec!["A", "B"]);
        assert_eq!(route.waypoints[1].x, 500.0);
    }

    #[test]
    fn changing_endpoints_clears_the_route() {
        let mut engine = engine();
        engine.set_start("A");
        engine.set_end("B");
        engine.build_local_route().expect("route");

        engine.swap_endpoints();
        assert_eq!(engine.selection().start.as_deref(), Some("B"));
        assert!(engine.route().is_none());

        engine.build_local_route().expect("route");
        engine.set_end("S1");
        assert!(engine.route().is_none());

        engine.build_local_route().expect("route");
        engine.set_start("B");
        assert!(engine.route().is_some(), "same start keeps the route");
        engine.set_start("S2");
        assert!(engine.route().is_none());
    }

    #[test]
    fn failed_route_request_clears_only_for_empty_routes() {
        let mut engine = engine();
        engine.set_start("A");
        engine.set_end("B");
        engine.build_local_route().expect("route");

        let err = engine.fail_route(MapError::Network("HTTP 502".into()));
        assert_eq!(err, MapError::Network("HTTP 502".into()));
        assert!(engine.route().is_some());

        assert_eq!(engine.fail_route(MapError::EmptyRoute), MapError::EmptyRoute);
        assert!(engine.route().is_none());
    }

    #[test]
    fn rejected_point_set_keeps_previous_points() {
        let mut engine = engine();
        let err = engine.set_points(vec![
            point("X", 0.0, 0.0, 1, Category::Hall),
            point("X", 1.0, 0.0, 1, Category::Hall),
        ]);
        assert!(matches!(err, Err(MapError::InvalidData(_))));
        assert_eq!(engine.points().len(), 4);
    }

    #[test]
    fn replacing_points_drops_stale_endpoints_and_route() {
        let mut engine = engine();
        engine.set_start("A");
        engine.set_end("B");
        engine.build_local_route().expect("route");
        engine
            .set_points(vec![point("A", 0.0, 0.0, 1, Category::Classroom)])
            .expect("unique ids");
        assert_eq!(engine.selection().end, None);
        assert!(engine.route().is_none());
    }

    #[test]
    fn pointer_press_on_point_selects_it() {
        let mut engine = engine();
        let (sx, sy) = engine.viewport().to_screen(10.0, 0.0);
        let outcome = engine.pointer_down(sx + 3.0, sy);
        assert_eq!(outcome, InputOutcome::Select("S1".to_string()));
        assert_eq!(engine.selected_point().map(|p| p.id.as_str()), Some("S1"));
        assert!(!engine.is_dragging());
    }

    #[test]
    fn drag_pans_viewport() {
        let mut engine = engine();
        let before = engine.viewport().clone();
        engine.pointer_down(5.0, 5.0);
        assert!(engine.is_dragging());
        engine.pointer_move(25.0, 15.0);
        assert!(engine.pointer_up());
        assert_eq!(engine.viewport().offset_x, before.offset_x + 20.0);
        assert_eq!(engine.viewport().offset_y, before.offset_y + 10.0);
    }

    #[test]
    fn hover_threshold_is_constant_in_screen_pixels() {
        let mut engine = engine();
        engine.wheel(-1.0, 400.0, 300.0);
        engine.wheel(-1.0, 400.0, 300.0);
        let (sx, sy) = engine.viewport().to_screen(0.0, 0.0);
        assert_eq!(
            engine.pointer_move(sx, sy + 19.0),
            InputOutcome::Hover(Some("A".to_string()))
        );
        assert_eq!(engine.pointer_move(sx, sy + 21.0), InputOutcome::Hover(None));
    }

    #[test]
    fn button_zoom_keeps_surface_center_fixed() {
        let mut engine = engine();
        let center = engine.viewport().to_world(400.0, 300.0);
        engine.zoom_in();
        let after = engine.viewport().to_world(400.0, 300.0);
        assert!((center.0 - after.0).abs() < 1e-9 && (center.1 - after.1).abs() < 1e-9);
        assert!((engine.viewport().scale - 1.2).abs() < 1e-12);
    }

    #[test]
    fn center_on_point_switches_floor() {
        let mut engine = engine();
        assert!(engine.center_on_point("B"));
        assert_eq!(engine.current_floor(), 2);
        let (sx, sy) = engine.viewport().to_screen(0.0, 0.0);
        assert!((sx - 400.0).abs() < 1e-9 && (sy - 300.0).abs() < 1e-9);
        assert!(!engine.center_on_point("nope"));
    }

    #[test]
    fn relocation_updates_route_copy() {
        let mut engine = engine();
        engine.set_start("A");
        engine.set_end("S1");
        engine.build_local_route().expect("route");
        engine.relocate_point("S1", 30.0, 40.0).expect("known point");
        let route = engine.route().expect("route kept");
        assert_eq!(route.waypoints[1].x, 30.0);
        assert_eq!(engine.point("S1").map(|p| p.y), Some(40.0));
    }

    #[test]
    fn floors_merge_geometry_and_points() {
        let mut engine = engine();
        engine.set_map(MapData::default());
        assert_eq!(engine.floors(), vec![1, 2, 3]);
        engine.mark_floor_asset(3, AssetStatus::Missing);
        assert_eq!(engine.floor_asset(3), AssetStatus::Missing);
        assert_eq!(engine.floor_asset(1), AssetStatus::Pending);
    }
}
