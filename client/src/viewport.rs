/// Viewport manages the pan/zoom transformation from world coordinates to screen coordinates.
/// `screen = world * scale + offset`.
#[derive(Debug, Clone, PartialEq)]
pub struct Viewport {
    pub offset_x: f64,
    pub offset_y: f64,
    pub scale: f64,
    min_scale: f64,
    max_scale: f64,
}

const DEFAULT_MIN_SCALE: f64 = 0.5;
const DEFAULT_MAX_SCALE: f64 = 3.0;
/// World point placed at the surface center by `reset`.
const HOME_X: f64 = 500.0;
const HOME_Y: f64 = 400.0;

impl Default for Viewport {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_SCALE, DEFAULT_MAX_SCALE)
    }
}

impl Viewport {
    pub fn new(min_scale: f64, max_scale: f64) -> Self {
        let (min_scale, max_scale) = if min_scale <= max_scale {
            (min_scale, max_scale)
        } else {
            (max_scale, min_scale)
        };
        Self {
            offset_x: 0.0,
            offset_y: 0.0,
            scale: 1.0_f64.clamp(min_scale, max_scale),
            min_scale,
            max_scale,
        }
    }

    /// Convert world coordinates to screen coordinates.
    pub fn to_screen(&self, wx: f64, wy: f64) -> (f64, f64) {
        (
            wx * self.scale + self.offset_x,
            wy * self.scale + self.offset_y,
        )
    }

    /// Convert screen coordinates to world coordinates.
    pub fn to_world(&self, sx: f64, sy: f64) -> (f64, f64) {
        (
            (sx - self.offset_x) / self.scale,
            (sy - self.offset_y) / self.scale,
        )
    }

    /// Multiply scale by `factor`, keeping the world point under the screen point fixed.
    pub fn zoom_at(&mut self, screen_x: f64, screen_y: f64, factor: f64) {
        if !factor.is_finite() || factor <= 0.0 {
            return;
        }
        let (wx, wy) = self.to_world(screen_x, screen_y);
        self.scale = (self.scale * factor).clamp(self.min_scale, self.max_scale);
        self.offset_x = screen_x - wx * self.scale;
        self.offset_y = screen_y - wy * self.scale;
    }

    /// Pan by screen-space delta.
    pub fn pan(&mut self, dx: f64, dy: f64) {
        self.offset_x += dx;
        self.offset_y += dy;
    }

    /// Scale 1 with the home point centered on the surface.
    pub fn reset(&mut self, surface_w: f64, surface_h: f64) {
        self.scale = 1.0_f64.clamp(self.min_scale, self.max_scale);
        self.offset_x = surface_w / 2.0 - HOME_X * self.scale;
        self.offset_y = surface_h / 2.0 - HOME_Y * self.scale;
    }

    /// Keep scale, put the world point at the surface center.
    pub fn center_on(&mut self, wx: f64, wy: f64, surface_w: f64, surface_h: f64) {
        self.offset_x = surface_w / 2.0 - wx * self.scale;
        self.offset_y = surface_h / 2.0 - wy * self.scale;
    }

    /// World rectangle currently visible on a surface of the given size.
    pub fn visible_world(&self, surface_w: f64, surface_h: f64) -> (f64, f64, f64, f64) {
        let (min_x, min_y) = self.to_world(0.0, 0.0);
        let (max_x, max_y) = self.to_world(surface_w, surface_h);
        (min_x, min_y, max_x, max_y)
    }

    /// Fit the viewport to show the given world-coordinate bounds with padding.
    pub fn fit_bounds(
        &mut self,
        min_x: f64,
        min_y: f64,
        max_x: f64,
        max_y: f64,
        canvas_w: f64,
        canvas_h: f64,
    ) {
        let world_w = max_x - min_x;
        let world_h = max_y - min_y;

        if world_w <= 0.0 || world_h <= 0.0 || canvas_w <= 0.0 || canvas_h <= 0.0 {
            return;
        }

        let padding = 0.05;
        let scale_x = canvas_w / (world_w * (1.0 + padding * 2.0));
        let scale_y = canvas_h / (world_h * (1.0 + padding * 2.0));
        self.scale = scale_x.min(scale_y).clamp(self.min_scale, self.max_scale);

        let center_x = (min_x + max_x) / 2.0;
        let center_y = (min_y + max_y) / 2.0;
        self.offset_x = canvas_w / 2.0 - center_x * self.scale;
        self.offset_y = canvas_h / 2.0 - center_y * self.scale;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    fn assert_close(actual: (f64, f64), expected: (f64, f64)) {
        let diff = (actual.0 - expected.0).abs().max((actual.1 - expected.1).abs());
        assert!(
            diff < EPS * expected.0.abs().max(expected.1.abs()).max(1.0),
            "expected {expected:?}, got {actual:?} (diff: {diff})"
        );
    }

    fn panned() -> Viewport {
        let mut vp = Viewport::default();
        vp.pan(137.5, -42.25);
        vp.zoom_at(10.0, 20.0, 1.7);
        vp
    }

    #[test]
    fn zoom_keeps_world_point_under_cursor() {
        let factors = [0.9, 1.1, 1.2, 0.5, 2.5, 1.0 / 1.2];
        let screens = [(0.0, 0.0), (400.0, 300.0), (-25.0, 913.5), (1280.0, 720.0)];
        for &factor in &factors {
            for &(sx, sy) in &screens {
                let mut vp = panned();
                let before = vp.to_world(sx, sy);
                vp.zoom_at(sx, sy, factor);
                assert_close(vp.to_world(sx, sy), before);
            }
        }
    }

    #[test]
    fn zoom_stays_anchored_when_clamped() {
        let mut vp = panned();
        let before = vp.to_world(300.0, 200.0);
        vp.zoom_at(300.0, 200.0, 100.0);
        assert_eq!(vp.scale, 3.0);
        assert_close(vp.to_world(300.0, 200.0), before);
    }

    #[test]
    fn scale_never_leaves_limits() {
        let mut vp = Viewport::default();
        for _ in 0..100 {
            vp.zoom_at(50.0, 50.0, 1.1);
            assert!(vp.scale <= 3.0);
        }
        assert_eq!(vp.scale, 3.0);
        for _ in 0..100 {
            vp.zoom_at(50.0, 50.0, 0.9);
            assert!(vp.scale >= 0.5);
        }
        assert_eq!(vp.scale, 0.5);
    }

    #[test]
    fn world_screen_roundtrip() {
        let vp = panned();
        for &(wx, wy) in &[(0.0, 0.0), (550.0, 200.0), (-1e4, 3.25), (1e5, -7e4)] {
            let (sx, sy) = vp.to_screen(wx, wy);
            assert_close(vp.to_world(sx, sy), (wx, wy));
        }
    }

    #[test]
    fn pan_is_independent_of_scale() {
        let mut vp = Viewport::default();
        vp.zoom_at(0.0, 0.0, 2.0);
        let before = (vp.offset_x, vp.offset_y);
        vp.pan(10.0, -5.0);
        assert_eq!((vp.offset_x, vp.offset_y), (before.0 + 10.0, before.1 - 5.0));
    }

    #[test]
    fn reset_centers_home_point_at_scale_one() {
        let mut vp = panned();
        vp.reset(1000.0, 800.0);
        assert_eq!(vp.scale, 1.0);
        assert_close(vp.to_screen(HOME_X, HOME_Y), (500.0, 400.0));
    }

    #[test]
    fn center_on_keeps_scale() {
        let mut vp = panned();
        let scale = vp.scale;
        vp.center_on(550.0, 200.0, 800.0, 600.0);
        assert_eq!(vp.scale, scale);
        assert_close(vp.to_screen(550.0, 200.0), (400.0, 300.0));
    }

    #[test]
    fn invalid_zoom_factor_is_ignored() {
        let mut vp = panned();
        let before = vp.clone();
        vp.zoom_at(1.0, 1.0, 0.0);
        vp.zoom_at(1.0, 1.0, f64::NAN);
        assert_eq!(vp, before);
    }

    #[test]
    fn fit_bounds_clamps_scale() {
        let mut vp = Viewport::default();
        vp.fit_bounds(0.0, 0.0, 10.0, 10.0, 800.0, 600.0);
        assert_eq!(vp.scale, 3.0);
        assert_close(vp.to_screen(5.0, 5.0), (400.0, 300.0));
    }
}
