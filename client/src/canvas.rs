use std::cell::Cell;
use std::rc::Rc;

use leptos::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, PointerEvent, WheelEvent};

use crate::app::MapHandle;
use crate::renderer::canvas2d;

pub fn device_pixel_ratio() -> f64 {
    web_sys::window()
        .map(|w| w.device_pixel_ratio())
        .unwrap_or(1.0)
        .max(1.0)
}

fn context_2d(canvas: &HtmlCanvasElement) -> Option<CanvasRenderingContext2d> {
    canvas
        .get_context("2d")
        .ok()
        .flatten()
        .and_then(|ctx| ctx.dyn_into::<CanvasRenderingContext2d>().ok())
}

/// Size the backing store to the container and repaint the scene.
fn paint_frame(canvas: &HtmlCanvasElement, map: MapHandle) {
    let Some(parent) = canvas.parent_element() else {
        return;
    };
    let w = parent.client_width() as f64;
    let h = parent.client_height() as f64;
    if w <= 0.0 || h <= 0.0 {
        return;
    }
    let dpr = device_pixel_ratio();
    let bw = (w * dpr).round().max(1.0) as u32;
    let bh = (h * dpr).round().max(1.0) as u32;
    if canvas.width() != bw || canvas.height() != bh {
        canvas.set_width(bw);
        canvas.set_height(bh);
    }
    let Some(list) = map.update_quiet(|engine| {
        engine.set_surface_size(w, h);
        engine.scene()
    }) else {
        return;
    };
    let Some(ctx) = context_2d(canvas) else {
        return;
    };
    if let Err(err) = canvas2d::paint(&ctx, &list, (w, h), dpr) {
        web_sys::console::warn_1(&format!("map paint failed: {err:?}").into());
    }
}

fn local_position(canvas_ref: NodeRef<leptos::html::Canvas>, e: &web_sys::MouseEvent) -> (f64, f64) {
    canvas_ref
        .get_untracked()
        .map(|el| {
            let rect = el.get_bounding_client_rect();
            (
                e.client_x() as f64 - rect.left(),
                e.client_y() as f64 - rect.top(),
            )
        })
        .unwrap_or((e.offset_x() as f64, e.offset_y() as f64))
}

#[component]
pub fn MapCanvas() -> impl IntoView {
    let map: MapHandle = expect_context();
    let canvas_ref = NodeRef::<leptos::html::Canvas>::new();

    // Where the current press started, for click-vs-drag detection
    let press_origin = Rc::new(Cell::new(None::<(f64, f64)>));

    Effect::new(move || {
        map.with(|_| ());
        if let Some(canvas) = canvas_ref.get() {
            paint_frame(&canvas, map);
        }
    });

    let update_cursor = move || {
        let cursor = map.with_untracked(|engine| {
            if engine.is_dragging() {
                "grabbing"
            } else if engine.selection().hovered.is_some() {
                "pointer"
            } else {
                "grab"
            }
        });
        if let Some(el) = canvas_ref.get_untracked() {
            web_sys::HtmlElement::style(&el)
                .set_property("cursor", cursor)
                .ok();
        }
    };

    let on_pointer_down = {
        let press_origin = press_origin.clone();
        move |e: PointerEvent| {
            let (x, y) = local_position(canvas_ref, &e);
            press_origin.set(Some((x, y)));
            if let Some(el) = canvas_ref.get_untracked() {
                el.set_pointer_capture(e.pointer_id()).ok();
            }
            map.apply(|engine| engine.pointer_down(x, y).needs_redraw());
            update_cursor();
        }
    };

    let on_pointer_move = move |e: PointerEvent| {
        let (x, y) = local_position(canvas_ref, &e);
        map.apply(|engine| engine.pointer_move(x, y).needs_redraw());
        update_cursor();
    };

    let on_pointer_up = {
        let press_origin = press_origin.clone();
        move |e: PointerEvent| {
            let (x, y) = local_position(canvas_ref, &e);
            let was_dragging = map.update_quiet(|engine| engine.pointer_up()).unwrap_or(false);
            // A press on empty space that barely moved closes the balloon
            if was_dragging && let Some((ox, oy)) = press_origin.take() {
                let slop = map.with_untracked(|engine| engine.config().drag_slop_px);
                if (x - ox).abs() < slop && (y - oy).abs() < slop {
                    map.update(|engine| engine.select(None));
                }
            }
            update_cursor();
        }
    };

    let on_pointer_leave = move |_: PointerEvent| {
        map.apply(|engine| engine.pointer_leave().needs_redraw());
        update_cursor();
    };

    let on_wheel = move |e: WheelEvent| {
        e.prevent_default();
        let (x, y) = local_position(canvas_ref, &e);
        map.apply(|engine| engine.wheel(e.delta_y(), x, y).needs_redraw());
    };

    view! {
        <div
            style="position: absolute; inset: 0; overflow: hidden;"
            on:wheel=on_wheel
            on:pointerdown=on_pointer_down
            on:pointermove=on_pointer_move
            on:pointerup=on_pointer_up
            on:pointerleave=on_pointer_leave
        >
            <canvas
                node_ref=canvas_ref
                style="position: absolute; inset: 0; width: 100%; height: 100%; touch-action: none; cursor: grab;"
            />
        </div>
    }
}
