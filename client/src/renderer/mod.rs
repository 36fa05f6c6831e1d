//! Scene description. `render` turns map state into an ordered list of draw
//! commands; `canvas2d` is the only code that touches the browser surface.

pub mod canvas2d;

use wayfinder_shared::{Floor, Point, Route};

use crate::assets::AssetStatus;
use crate::colors::hex_alpha_css;
use crate::config::EngineConfig;
use crate::engine::Selection;
use crate::theme::Theme;
use crate::viewport::Viewport;

const WALL_PX: f64 = 4.0;
const DOOR_PX: f64 = 10.0;
const ROOM_STROKE_PX: f64 = 2.0;
const ROOM_LABEL_PX: f64 = 12.0;
const POINT_RADIUS_PX: f64 = 12.0;
const POINT_RADIUS_HOVER_PX: f64 = 14.0;
const POINT_RADIUS_ACTIVE_PX: f64 = 16.0;
const POINT_STROKE_PX: f64 = 1.5;
const POINT_STROKE_ACTIVE_PX: f64 = 3.0;
const ACCENT_RING_GAP_PX: f64 = 4.0;
const LABEL_PX: f64 = 12.0;
const LABEL_OFFSET_PX: f64 = 25.0;
const LABEL_HALO_PX: f64 = 3.0;
const ROUTE_PX: f64 = 6.0;
const ROUTE_DASH_PX: [f64; 2] = [15.0, 10.0];
const ARROW_LENGTH_PX: f64 = 15.0;
const ARROW_HALF_WIDTH_PX: f64 = 7.0;

#[derive(Debug, Clone, PartialEq)]
pub enum Fill {
    Solid(String),
    /// Lighter center fading to `outer` at the rim.
    Radial { inner: String, outer: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Stroke {
    pub color: String,
    pub width: f64,
}

impl Stroke {
    fn new(color: impl Into<String>, width: f64) -> Self {
        Self {
            color: color.into(),
            width,
        }
    }
}

/// One drawing primitive. Coordinates are world units unless noted.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCmd {
    /// Screen-space fill of the whole surface.
    Clear { color: String },
    SetTransform {
        scale: f64,
        offset_x: f64,
        offset_y: f64,
    },
    /// Floor background image at the world origin, natural size.
    Image { floor: i32 },
    Line {
        from: (f64, f64),
        to: (f64, f64),
        stroke: Stroke,
    },
    Polyline {
        points: Vec<(f64, f64)>,
        stroke: Stroke,
        dash: Option<[f64; 2]>,
    },
    /// Cubic curve per segment, control points at 30%/70% of dx.
    CurvedPath { points: Vec<(f64, f64)>, stroke: Stroke },
    Rect {
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        fill: Option<String>,
        stroke: Option<Stroke>,
    },
    Circle {
        center: (f64, f64),
        radius: f64,
        fill: Option<Fill>,
        stroke: Option<Stroke>,
        shadow: Option<String>,
    },
    Triangle { points: [(f64, f64); 3], color: String },
    /// Centered text.
    Text {
        position: (f64, f64),
        text: String,
        font_px: f64,
        bold: bool,
        color: String,
        halo: Option<Stroke>,
    },
    /// Screen-space notice for a floor whose plan could not be loaded.
    Placeholder { floor: i32, message: String, color: String },
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DrawList {
    pub commands: Vec<DrawCmd>,
}

impl DrawList {
    fn push(&mut self, cmd: DrawCmd) {
        self.commands.push(cmd);
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

/// Immutable, frame-local scene input.
#[derive(Clone, Copy)]
pub struct SceneSnapshot<'a> {
    pub viewport: &'a Viewport,
    pub surface: (f64, f64),
    pub floor: i32,
    pub geometry: Option<&'a Floor>,
    pub floor_asset: AssetStatus,
    pub points: &'a [Point],
    pub selection: &'a Selection,
    pub route: Option<&'a Route>,
    pub theme: &'a Theme,
    pub config: &'a EngineConfig,
}

/// Pure: identical snapshots yield identical draw lists.
pub fn render(scene: &SceneSnapshot<'_>) -> DrawList {
    let mut out = DrawList::default();
    let vp = scene.viewport;

    out.push(DrawCmd::Clear {
        color: scene.theme.background.to_string(),
    });
    out.push(DrawCmd::SetTransform {
        scale: vp.scale,
        offset_x: vp.offset_x,
        offset_y: vp.offset_y,
    });
    if scene.floor_asset == AssetStatus::Ready {
        out.push(DrawCmd::Image { floor: scene.floor });
    }

    draw_grid(&mut out, scene);
    if scene.floor_asset == AssetStatus::Missing {
        out.push(DrawCmd::Placeholder {
            floor: scene.floor,
            message: format!("Floor {} plan is unavailable", scene.floor),
            color: scene.theme.placeholder.to_string(),
        });
    }
    if let Some(floor) = scene.geometry {
        draw_geometry(&mut out, scene, floor);
    }
    draw_points(&mut out, scene);
    if let Some(route) = scene.route {
        draw_route(&mut out, scene, route);
    }

    out
}

fn draw_grid(out: &mut DrawList, scene: &SceneSnapshot<'_>) {
    let step = scene.config.grid_step;
    let (surface_w, surface_h) = scene.surface;
    if step <= 0.0 || surface_w <= 0.0 || surface_h <= 0.0 {
        return;
    }
    let (min_x, min_y, max_x, max_y) = scene.viewport.visible_world(surface_w, surface_h);
    let stroke = Stroke::new(
        scene.theme.grid,
        scene.config.grid_line_px / scene.viewport.scale,
    );

    let mut x = (min_x / step).floor() * step;
    while x <= max_x {
        out.push(DrawCmd::Line {
            from: (x, min_y),
            to: (x, max_y),
            stroke: stroke.clone(),
        });
        x += step;
    }
    let mut y = (min_y / step).floor() * step;
    while y <= max_y {
        out.push(DrawCmd::Line {
            from: (min_x, y),
            to: (max_x, y),
            stroke: stroke.clone(),
        });
        y += step;
    }
}

fn draw_geometry(out: &mut DrawList, scene: &SceneSnapshot<'_>, floor: &Floor) {
    let scale = scene.viewport.scale;
    let theme = scene.theme;

    for room in &floor.rooms {
        let color = room.fill_hex();
        out.push(DrawCmd::Rect {
            x: room.x,
            y: room.y,
            width: room.width,
            height: room.height,
            fill: Some(hex_alpha_css(&color, theme.room_fill_alpha)),
            stroke: Some(Stroke::new(color, ROOM_STROKE_PX / scale)),
        });
        if !room.name.is_empty() {
            out.push(DrawCmd::Text {
                position: room.center(),
                text: room.name.clone(),
                font_px: ROOM_LABEL_PX / scale,
                bold: false,
                color: theme.room_text.to_string(),
                halo: None,
            });
        }
    }

    for wall in &floor.walls {
        out.push(DrawCmd::Line {
            from: (wall.x1, wall.y1),
            to: (wall.x2, wall.y2),
            stroke: Stroke::new(theme.wall, WALL_PX / scale),
        });
    }

    // Doors sit on top of the walls they interrupt
    let side = DOOR_PX / scale;
    for door in &floor.doors {
        out.push(DrawCmd::Rect {
            x: door.x - side / 2.0,
            y: door.y - side / 2.0,
            width: side,
            height: side,
            fill: Some(theme.door.to_string()),
            stroke: None,
        });
    }
}

fn draw_points(out: &mut DrawList, scene: &SceneSnapshot<'_>) {
    let scale = scene.viewport.scale;
    let theme = scene.theme;
    let selection = scene.selection;

    for point in scene.points.iter().filter(|p| p.floor == scene.floor) {
        let id = Some(point.id.as_str());
        let is_start = selection.start.as_deref() == id;
        let is_end = selection.end.as_deref() == id;
        let is_selected = selection.selected.as_deref() == id;
        let is_hovered = selection.hovered.as_deref() == id;
        let active = is_start || is_end || is_selected;

        let radius_px = if active {
            POINT_RADIUS_ACTIVE_PX
        } else if is_hovered {
            POINT_RADIUS_HOVER_PX
        } else {
            POINT_RADIUS_PX
        };
        let radius = radius_px / scale;
        let style = theme.category(point.category);
        let stroke = if active || is_hovered {
            Stroke::new(theme.point_stroke, POINT_STROKE_ACTIVE_PX / scale)
        } else {
            Stroke::new(theme.category_outline(point.category), POINT_STROKE_PX / scale)
        };

        out.push(DrawCmd::Circle {
            center: (point.x, point.y),
            radius,
            fill: Some(if theme.point_gradient {
                Fill::Radial {
                    inner: style.color.to_string(),
                    outer: theme.category_outline(point.category),
                }
            } else {
                Fill::Solid(style.color.to_string())
            }),
            stroke: Some(stroke),
            shadow: (active || is_hovered).then(|| hex_alpha_css(style.color, 0.5)),
        });

        let accent = if is_start {
            Some(theme.start)
        } else if is_end {
            Some(theme.end)
        } else if is_selected {
            Some(theme.selection)
        } else {
            None
        };
        if let Some(accent) = accent {
            out.push(DrawCmd::Circle {
                center: (point.x, point.y),
                radius: radius + ACCENT_RING_GAP_PX / scale,
                fill: None,
                stroke: Some(Stroke::new(accent, POINT_STROKE_ACTIVE_PX / scale)),
                shadow: None,
            });
        }

        out.push(DrawCmd::Text {
            position: (point.x, point.y),
            text: style.glyph.to_string(),
            font_px: radius * 1.1,
            bold: false,
            color: theme.text.to_string(),
            halo: None,
        });

        if scale > scene.config.label_min_scale || is_hovered {
            out.push(DrawCmd::Text {
                position: (point.x, point.y - LABEL_OFFSET_PX / scale),
                text: point.name.clone(),
                font_px: LABEL_PX / scale,
                bold: true,
                color: theme.text.to_string(),
                halo: Some(Stroke::new(theme.text_halo, LABEL_HALO_PX / scale)),
            });
        }
    }
}

fn draw_route(out: &mut DrawList, scene: &SceneSnapshot<'_>, route: &Route) {
    let scale = scene.viewport.scale;
    let theme = scene.theme;
    let points: Vec<(f64, f64)> = route
        .waypoints_on_floor(scene.floor)
        .into_iter()
        .map(|p| (p.x, p.y))
        .collect();
    if points.len() < 2 {
        return;
    }

    let stroke = Stroke::new(theme.route, ROUTE_PX / scale);
    if theme.route_curved {
        out.push(DrawCmd::CurvedPath {
            points: points.clone(),
            stroke,
        });
    } else {
        out.push(DrawCmd::Polyline {
            points: points.clone(),
            stroke,
            dash: Some([ROUTE_DASH_PX[0] / scale, ROUTE_DASH_PX[1] / scale]),
        });
    }

    for pair in points.windows(2) {
        let (from, to) = (pair[0], pair[1]);
        let (dx, dy) = (to.0 - from.0, to.1 - from.1);
        if dx.hypot(dy) <= scene.config.arrow_min_segment {
            continue;
        }
        let t = scene.config.arrow_position;
        let tip = (from.0 + dx * t, from.1 + dy * t);
        out.push(DrawCmd::Triangle {
            points: arrow_head(tip, dy.atan2(dx), scale),
            color: theme.route_arrow.to_string(),
        });
    }
}

/// Triangle pointing along `angle`, tip at `tip`, sized in screen pixels.
fn arrow_head(tip: (f64, f64), angle: f64, scale: f64) -> [(f64, f64); 3] {
    let (sin, cos) = angle.sin_cos();
    let place = |lx: f64, ly: f64| {
        let (lx, ly) = (lx / scale, ly / scale);
        (tip.0 + lx * cos - ly * sin, tip.1 + lx * sin + ly * cos)
    };
    [
        place(0.0, 0.0),
        place(-ARROW_LENGTH_PX, -ARROW_HALF_WIDTH_PX),
        place(-ARROW_LENGTH_PX, ARROW_HALF_WIDTH_PX),
    ]
}

/// Control points for the curved route segment from `a` to `b`.
pub fn curve_controls(a: (f64, f64), b: (f64, f64)) -> ((f64, f64), (f64, f64)) {
    let dx = b.0 - a.0;
    ((a.0 + dx * 0.3, a.1), (a.0 + dx * 0.7, b.1))
}
