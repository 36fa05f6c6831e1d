use std::collections::HashMap;
use std::sync::Arc;

use wayfinder_shared::{DuplicateId, Point, validate_unique_ids};

/// Point set in canonical (load) order with an id lookup table.
///
/// Hit-testing is a linear scan over one floor: floors hold tens of points,
/// and hover only triggers a redraw when the nearest point changes.
/// Points are shared through an `Arc`, so a relocation swaps in a new copy
/// instead of mutating a point a render pass may be reading.
#[derive(Debug, Clone, Default)]
pub struct PointIndex {
    points: Arc<Vec<Point>>,
    by_id: HashMap<String, usize>,
}

impl PointIndex {
    pub fn build(points: Vec<Point>) -> Result<Self, DuplicateId> {
        validate_unique_ids(&points)?;
        let by_id = points
            .iter()
            .enumerate()
            .map(|(idx, p)| (p.id.clone(), idx))
            .collect();
        Ok(Self {
            points: Arc::new(points),
            by_id,
        })
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn all(&self) -> &[Point] {
        &self.points
    }

    /// Cheap handle to the current point set.
    pub fn snapshot(&self) -> Arc<Vec<Point>> {
        Arc::clone(&self.points)
    }

    pub fn get(&self, id: &str) -> Option<&Point> {
        self.by_id.get(id).and_then(|&idx| self.points.get(idx))
    }

    pub fn on_floor(&self, floor: i32) -> impl Iterator<Item = &Point> {
        self.points.iter().filter(move |p| p.floor == floor)
    }

    /// Nearest point on `floor` strictly closer than `threshold` world units.
    /// Ties go to the point that comes first in canonical order.
    pub fn nearest(&self, floor: i32, wx: f64, wy: f64, threshold: f64) -> Option<&Point> {
        let mut best: Option<(&Point, f64)> = None;
        for point in self.on_floor(floor) {
            let dist = point.distance_to_xy(wx, wy);
            if dist >= threshold {
                continue;
            }
            match best {
                Some((_, best_dist)) if dist >= best_dist => {}
                _ => best = Some((point, dist)),
            }
        }
        best.map(|(point, _)| point)
    }

    /// Floors that have at least one point, ascending.
    pub fn floors(&self) -> Vec<i32> {
        let mut floors: Vec<i32> = self.points.iter().map(|p| p.floor).collect();
        floors.sort_unstable();
        floors.dedup();
        floors
    }

    /// Move a point, copy-on-write. Returns the updated point.
    pub fn relocate(&mut self, id: &str, x: f64, y: f64) -> Option<Point> {
        let idx = *self.by_id.get(id)?;
        let points = Arc::make_mut(&mut self.points);
        let point = points.get_mut(idx)?;
        point.x = x;
        point.y = y;
        Some(point.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wayfinder_shared::Category;

    fn point(id: &str, x: f64, y: f64, floor: i32) -> Point {
        Point {
            id: id.to_string(),
            name: id.to_string(),
            x,
            y,
            floor,
            category: Category::Classroom,
            description: String::new(),
        }
    }

    fn index() -> PointIndex {
        PointIndex::build(vec![
            point("a", 0.0, 0.0, 1),
            point("b", 10.0, 0.0, 1),
            point("c", 5.0, 0.0, 2),
            point("d", 100.0, 100.0, 1),
        ])
        .expect("unique ids")
    }

    #[test]
    fn nearest_picks_closest_on_floor() {
        let idx = index();
        assert_eq!(idx.nearest(1, 9.0, 1.0, 20.0).map(|p| p.id.as_str()), Some("b"));
        assert_eq!(idx.nearest(2, 9.0, 1.0, 20.0).map(|p| p.id.as_str()), Some("c"));
        assert!(idx.nearest(3, 0.0, 0.0, 20.0).is_none());
    }

    #[test]
    fn equidistant_query_returns_first_in_order() {
        let idx = index();
        for _ in 0..5 {
            assert_eq!(idx.nearest(1, 5.0, 0.0, 20.0).map(|p| p.id.as_str()), Some("a"));
        }
    }

    #[test]
    fn threshold_is_strict() {
        let idx = index();
        assert!(idx.nearest(1, 0.0, 5.0, 5.0).is_none());
        assert!(idx.nearest(1, 0.0, 5.0, 5.0 + 1e-9).is_some());
    }

    #[test]
    fn nothing_within_range_returns_none() {
        let idx = PointIndex::build(vec![point("p", 5.0, 7.0, 1)]).expect("unique ids");
        assert!(idx.nearest(1, 5.0, 5.0, 1.0).is_none());
    }

    #[test]
    fn duplicate_ids_fail_to_build() {
        let err = PointIndex::build(vec![point("x", 0.0, 0.0, 1), point("x", 1.0, 1.0, 2)])
            .expect_err("duplicate id");
        assert_eq!(err, DuplicateId("x".to_string()));
    }

    #[test]
    fn relocate_does_not_touch_existing_snapshots() {
        let mut idx = index();
        let before = idx.snapshot();
        let moved = idx.relocate("b", 42.0, 43.0).expect("known id");
        assert_eq!((moved.x, moved.y), (42.0, 43.0));
        assert_eq!(before[1].x, 10.0);
        assert_eq!(idx.get("b").map(|p| p.x), Some(42.0));
        assert!(idx.relocate("missing", 0.0, 0.0).is_none());
    }

    #[test]
    fn floors_are_sorted_and_unique() {
        assert_eq!(index().floors(), vec![1, 2]);
    }
}
