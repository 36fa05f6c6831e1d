mod api;
mod app;
mod assets;
mod canvas;
mod colors;
mod config;
mod engine;
mod error;
mod input;
mod renderer;
mod sidebar;
mod spatial;
mod theme;
mod viewport;

use leptos::mount::mount_to;
use std::any::Any;
use std::cell::RefCell;
use wasm_bindgen::JsCast;

thread_local! {
    static APP_MOUNT_HANDLE: RefCell<Option<Box<dyn Any>>> = RefCell::new(None);
}

/// `#app` when the page provides it, otherwise the body.
fn mount_target() -> Option<web_sys::HtmlElement> {
    let document = web_sys::window()?.document()?;
    document
        .get_element_by_id("app")
        .and_then(|node| node.dyn_into::<web_sys::HtmlElement>().ok())
        .or_else(|| document.body())
}

fn main() {
    console_error_panic_hook::set_once();
    let Some(target) = mount_target() else {
        web_sys::console::warn_1(&"wayfinder: no mount target".into());
        return;
    };

    APP_MOUNT_HANDLE.with(move |slot| {
        // A second mount must not leave the first one's effects running
        let _old = slot.borrow_mut().take();
        let handle = mount_to(target, app::App);
        *slot.borrow_mut() = Some(Box::new(handle));
    });
}
