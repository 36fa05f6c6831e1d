use std::f64::consts::TAU;

use wasm_bindgen::JsValue;
use web_sys::CanvasRenderingContext2d;

use super::{DrawCmd, DrawList, Fill, Stroke, curve_controls};
use crate::assets;

const SHADOW_BLUR_PX: f64 = 6.0;
const FONT_FAMILY: &str = "system-ui, -apple-system, 'Segoe UI', sans-serif";
const PLACEHOLDER_FONT_PX: f64 = 14.0;
const PLACEHOLDER_MARGIN_PX: f64 = 16.0;

/// Paints a draw list onto a 2D context. `surface` is the CSS-pixel size;
/// `dpr` maps CSS pixels onto the backing store.
pub fn paint(
    ctx: &CanvasRenderingContext2d,
    list: &DrawList,
    surface: (f64, f64),
    dpr: f64,
) -> Result<(), JsValue> {
    let mut world = (1.0, 0.0, 0.0);
    ctx.set_line_cap("round");
    ctx.set_line_join("round");

    for cmd in &list.commands {
        match cmd {
            DrawCmd::Clear { color } => {
                ctx.set_transform(dpr, 0.0, 0.0, dpr, 0.0, 0.0)?;
                ctx.set_fill_style_str(color);
                ctx.fill_rect(0.0, 0.0, surface.0, surface.1);
            }
            DrawCmd::SetTransform {
                scale,
                offset_x,
                offset_y,
            } => {
                world = (*scale, *offset_x, *offset_y);
                apply_world(ctx, world, dpr)?;
            }
            DrawCmd::Image { floor } => {
                if let Some(image) = assets::floor_image(*floor) {
                    ctx.draw_image_with_html_image_element(&image, 0.0, 0.0)?;
                }
            }
            DrawCmd::Line { from, to, stroke } => {
                ctx.begin_path();
                ctx.move_to(from.0, from.1);
                ctx.line_to(to.0, to.1);
                apply_stroke(ctx, stroke);
                ctx.stroke();
            }
            DrawCmd::Polyline {
                points,
                stroke,
                dash,
            } => {
                let Some((first, rest)) = points.split_first() else {
                    continue;
                };
                if let Some([on, off]) = dash {
                    set_dash(ctx, &[*on, *off])?;
                }
                ctx.begin_path();
                ctx.move_to(first.0, first.1);
                for p in rest {
                    ctx.line_to(p.0, p.1);
                }
                apply_stroke(ctx, stroke);
                ctx.stroke();
                set_dash(ctx, &[])?;
            }
            DrawCmd::CurvedPath { points, stroke } => {
                let Some(first) = points.first() else {
                    continue;
                };
                ctx.begin_path();
                ctx.move_to(first.0, first.1);
                for pair in points.windows(2) {
                    let (c1, c2) = curve_controls(pair[0], pair[1]);
                    ctx.bezier_curve_to(c1.0, c1.1, c2.0, c2.1, pair[1].0, pair[1].1);
                }
                apply_stroke(ctx, stroke);
                ctx.stroke();
            }
            DrawCmd::Rect {
                x,
                y,
                width,
                height,
                fill,
                stroke,
            } => {
                if let Some(fill) = fill {
                    ctx.set_fill_style_str(fill);
                    ctx.fill_rect(*x, *y, *width, *height);
                }
                if let Some(stroke) = stroke {
                    apply_stroke(ctx, stroke);
                    ctx.stroke_rect(*x, *y, *width, *height);
                }
            }
            DrawCmd::Circle {
                center,
                radius,
                fill,
                stroke,
                shadow,
            } => {
                ctx.begin_path();
                ctx.arc(center.0, center.1, *radius, 0.0, TAU)?;
                if let Some(shadow) = shadow {
                    ctx.set_shadow_color(shadow);
                    ctx.set_shadow_blur(SHADOW_BLUR_PX * dpr);
                }
                match fill {
                    Some(Fill::Solid(color)) => {
                        ctx.set_fill_style_str(color);
                        ctx.fill();
                    }
                    Some(Fill::Radial { inner, outer }) => {
                        let gradient = ctx.create_radial_gradient(
                            center.0 - radius * 0.3,
                            center.1 - radius * 0.3,
                            0.0,
                            center.0,
                            center.1,
                            *radius,
                        )?;
                        gradient.add_color_stop(0.0, inner)?;
                        gradient.add_color_stop(1.0, outer)?;
                        ctx.set_fill_style_canvas_gradient(&gradient);
                        ctx.fill();
                    }
                    None => {}
                }
                if shadow.is_some() {
                    ctx.set_shadow_color("transparent");
                    ctx.set_shadow_blur(0.0);
                }
                if let Some(stroke) = stroke {
                    apply_stroke(ctx, stroke);
                    ctx.stroke();
                }
            }
            DrawCmd::Triangle { points, color } => {
                let [a, b, c] = points;
                ctx.begin_path();
                ctx.move_to(a.0, a.1);
                ctx.line_to(b.0, b.1);
                ctx.line_to(c.0, c.1);
                ctx.close_path();
                ctx.set_fill_style_str(color);
                ctx.fill();
            }
            DrawCmd::Text {
                position,
                text,
                font_px,
                bold,
                color,
                halo,
            } => {
                let weight = if *bold { "600 " } else { "" };
                ctx.set_font(&format!("{weight}{font_px}px {FONT_FAMILY}"));
                ctx.set_text_align("center");
                ctx.set_text_baseline("middle");
                if let Some(halo) = halo {
                    apply_stroke(ctx, halo);
                    ctx.stroke_text(text, position.0, position.1).ok();
                }
                ctx.set_fill_style_str(color);
                ctx.fill_text(text, position.0, position.1).ok();
            }
            DrawCmd::Placeholder { message, color, .. } => {
                ctx.set_transform(dpr, 0.0, 0.0, dpr, 0.0, 0.0)?;
                ctx.set_font(&format!("{PLACEHOLDER_FONT_PX}px {FONT_FAMILY}"));
                ctx.set_text_align("center");
                ctx.set_text_baseline("top");
                ctx.set_fill_style_str(color);
                ctx.fill_text(message, surface.0 / 2.0, PLACEHOLDER_MARGIN_PX)
                    .ok();
                apply_world(ctx, world, dpr)?;
            }
        }
    }
    Ok(())
}

fn apply_world(
    ctx: &CanvasRenderingContext2d,
    (scale, offset_x, offset_y): (f64, f64, f64),
    dpr: f64,
) -> Result<(), JsValue> {
    ctx.set_transform(
        scale * dpr,
        0.0,
        0.0,
        scale * dpr,
        offset_x * dpr,
        offset_y * dpr,
    )
}

fn apply_stroke(ctx: &CanvasRenderingContext2d, stroke: &Stroke) {
    ctx.set_stroke_style_str(&stroke.color);
    ctx.set_line_width(stroke.width);
}

fn set_dash(ctx: &CanvasRenderingContext2d, segments: &[f64]) -> Result<(), JsValue> {
    let array = js_sys::Array::new();
    for segment in segments {
        array.push(&JsValue::from_f64(*segment));
    }
    ctx.set_line_dash(&array)
}
