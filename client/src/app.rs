use std::cell::RefCell;

use gloo_timers::callback::Timeout;
use leptos::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::spawn_local;

use crate::api;
use crate::assets::{self, AssetStatus};
use crate::canvas::MapCanvas;
use crate::config::{EngineConfig, RoutingMode, Settings, ThemePreset};
use crate::engine::MapEngine;
use crate::error::MapError;
use crate::sidebar::Sidebar;
use crate::theme::Theme;

const NOTICE_TTL_MS: u32 = 3_000;

/// Shared handle to the map engine. Reads through `with` subscribe to every
/// engine mutation made through `update`/`apply`.
#[derive(Clone, Copy)]
pub(crate) struct MapHandle {
    engine: StoredValue<MapEngine>,
    revision: RwSignal<u64>,
}

impl MapHandle {
    fn new(engine: MapEngine) -> Self {
        Self {
            engine: StoredValue::new(engine),
            revision: RwSignal::new(0),
        }
    }

    pub fn with<R>(&self, f: impl FnOnce(&MapEngine) -> R) -> R {
        self.revision.track();
        self.engine.with_value(f)
    }

    pub fn with_untracked<R>(&self, f: impl FnOnce(&MapEngine) -> R) -> R {
        self.engine.with_value(f)
    }

    /// Mutate the engine and schedule a repaint.
    pub fn update<R>(&self, f: impl FnOnce(&mut MapEngine) -> R) -> Option<R> {
        let out = self.engine.try_update_value(f);
        self.touch();
        out
    }

    /// Mutate the engine; repaint only when `f` reports a visible change.
    pub fn apply(&self, f: impl FnOnce(&mut MapEngine) -> bool) {
        if self.engine.try_update_value(f).unwrap_or(false) {
            self.touch();
        }
    }

    /// Mutate without notifying subscribers (used by the painter itself).
    pub fn update_quiet<R>(&self, f: impl FnOnce(&mut MapEngine) -> R) -> Option<R> {
        self.engine.try_update_value(f)
    }

    pub fn touch(&self) {
        self.revision.update(|r| *r = r.wrapping_add(1));
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub(crate) enum NoticeKind {
    Info,
    Error,
}

#[derive(Clone, PartialEq, Debug)]
pub(crate) struct Notice {
    pub id: u64,
    pub kind: NoticeKind,
    pub message: String,
}

/// Transient toasts, newest last.
#[derive(Clone, Copy)]
pub(crate) struct Notices {
    items: RwSignal<Vec<Notice>>,
    next_id: StoredValue<u64>,
}

impl Notices {
    fn new() -> Self {
        Self {
            items: RwSignal::new(Vec::new()),
            next_id: StoredValue::new(0),
        }
    }

    pub fn items(&self) -> Vec<Notice> {
        self.items.get()
    }

    pub fn push(&self, kind: NoticeKind, message: impl Into<String>) {
        let id = self
            .next_id
            .try_update_value(|n| {
                *n += 1;
                *n
            })
            .unwrap_or_default();
        self.items.update(|items| {
            items.push(Notice {
                id,
                kind,
                message: message.into(),
            })
        });
        let items = self.items;
        Timeout::new(NOTICE_TTL_MS, move || {
            items.try_update(|items| items.retain(|n| n.id != id));
        })
        .forget();
    }

    pub fn dismiss(&self, id: u64) {
        self.items.update(|items| items.retain(|n| n.id != id));
    }

    /// Blocking errors become an alert, everything else a toast.
    pub fn report(&self, err: &MapError) {
        web_sys::console::warn_1(&format!("map: {err}").into());
        if err.is_blocking() {
            if let Some(window) = web_sys::window() {
                window.alert_with_message(&err.to_string()).ok();
            }
            return;
        }
        self.push(NoticeKind::Error, err.to_string());
    }
}

#[derive(Clone, Copy)]
pub(crate) struct ThemeSetting(pub RwSignal<ThemePreset>);
#[derive(Clone, Copy)]
pub(crate) struct RoutingSetting(pub RwSignal<RoutingMode>);

/// Build a route between the chosen endpoints with the active strategy.
pub(crate) fn request_route(map: MapHandle, notices: Notices, mode: RoutingMode) {
    match mode {
        RoutingMode::Local => {
            let outcome = map
                .update(|engine| engine.build_local_route().map(|route| route.total_distance_meters))
                .unwrap_or(Err(MapError::EmptyRoute));
            match outcome {
                Ok(meters) => notices.push(NoticeKind::Info, format!("Route built: {meters:.0} m")),
                Err(err) => notices.report(&err),
            }
        }
        RoutingMode::Server => {
            let ids = map.with_untracked(|engine| engine.endpoint_ids());
            let (start_id, end_id) = match ids {
                Ok(ids) => ids,
                Err(err) => {
                    notices.report(&err);
                    return;
                }
            };
            spawn_local(async move {
                let outcome = match api::navigate(&start_id, &end_id).await {
                    Ok(resp) => map
                        .update(|engine| {
                            engine
                                .apply_route(resp.path)
                                .map(|route| route.total_distance_meters)
                        })
                        .unwrap_or(Err(MapError::EmptyRoute)),
                    Err(err) => Err(map
                        .update(|engine| engine.fail_route(err.clone()))
                        .unwrap_or(err)),
                };
                match outcome {
                    Ok(meters) => {
                        notices.push(NoticeKind::Info, format!("Route built: {meters:.0} m"))
                    }
                    Err(err) => notices.report(&err),
                }
            });
        }
    }
}

fn deep_link_point() -> Option<String> {
    let search = web_sys::window()?.location().search().ok()?;
    let params = web_sys::UrlSearchParams::new_with_str(&search).ok()?;
    params.get("point").filter(|id| !id.is_empty())
}

fn load_map_data(map: MapHandle, notices: Notices) {
    spawn_local(async move {
        match api::fetch_map().await {
            Ok(data) => {
                map.update(|engine| engine.set_map(data));
            }
            Err(err) => notices.report(&err),
        }
        match api::fetch_points().await {
            Ok(points) => {
                let count = points.len();
                if let Some(Err(err)) = map.update(|engine| engine.set_points(points)) {
                    notices.report(&err);
                    return;
                }
                web_sys::console::info_1(&format!("map: loaded {count} points").into());
            }
            Err(err) => {
                notices.report(&err);
                return;
            }
        }
        if let Some(id) = deep_link_point() {
            let found = map
                .update(|engine| {
                    // QR codes on the walls open the map with "you are here" as start
                    engine.select(Some(id.clone()));
                    engine.set_start(&id) && engine.center_on_point(&id)
                })
                .unwrap_or(false);
            if !found {
                notices.push(NoticeKind::Error, format!("Unknown place: {id}"));
            }
        }
    });
}

struct WindowBinding {
    window: web_sys::Window,
    event: &'static str,
    handler: wasm_bindgen::closure::Closure<dyn Fn(web_sys::Event)>,
}

thread_local! {
    static WINDOW_BINDINGS: RefCell<Vec<WindowBinding>> = const { RefCell::new(Vec::new()) };
}

fn bind_window(event: &'static str, handler: impl Fn(web_sys::Event) + 'static) {
    let Some(window) = web_sys::window() else {
        return;
    };
    WINDOW_BINDINGS.with(|slot| {
        slot.borrow_mut().retain(|old| {
            if old.event != event {
                return true;
            }
            old.window
                .remove_event_listener_with_callback(event, old.handler.as_ref().unchecked_ref())
                .ok();
            false
        });
    });
    let handler = wasm_bindgen::closure::Closure::<dyn Fn(web_sys::Event)>::new(handler);
    if window
        .add_event_listener_with_callback(event, handler.as_ref().unchecked_ref())
        .is_ok()
    {
        WINDOW_BINDINGS.with(|slot| {
            slot.borrow_mut().push(WindowBinding {
                window: window.clone(),
                event,
                handler,
            });
        });
    }
}

#[component]
pub fn App() -> impl IntoView {
    let saved = Settings::load();
    let theme_preset: RwSignal<ThemePreset> = RwSignal::new(saved.theme);
    let routing_mode: RwSignal<RoutingMode> = RwSignal::new(saved.routing);
    let map = MapHandle::new(MapEngine::new(
        EngineConfig::from_settings(&saved),
        Theme::from_preset(saved.theme),
    ));
    let notices = Notices::new();

    provide_context(map);
    provide_context(notices);
    provide_context(ThemeSetting(theme_preset));
    provide_context(RoutingSetting(routing_mode));

    Effect::new(move || {
        let preset = theme_preset.get();
        map.update(|engine| engine.set_theme(Theme::from_preset(preset)));
    });

    // Persist settings whenever they change
    Effect::new(move || {
        let settings = Settings {
            theme: theme_preset.get(),
            routing: routing_mode.get(),
            walk_speed_m_per_min: saved.walk_speed_m_per_min,
        };
        settings.save();
    });

    // Load the current floor's background once per floor
    let current_floor = Memo::new(move |_| map.with(|engine| engine.current_floor()));
    Effect::new(move || {
        let floor = current_floor.get();
        if map.with_untracked(|engine| engine.floor_asset(floor)) != AssetStatus::Pending {
            return;
        }
        spawn_local(async move {
            let status = assets::load_floor_image(floor).await;
            map.update(|engine| engine.mark_floor_asset(floor, status));
            if status == AssetStatus::Missing {
                notices.report(&MapError::FloorAssetMissing(floor));
            }
        });
    });

    Effect::new(move || {
        load_map_data(map, notices);
    });

    Effect::new(move || {
        bind_window("resize", move |_| map.touch());
        bind_window("keydown", move |e| {
            let Ok(e) = e.dyn_into::<web_sys::KeyboardEvent>() else {
                return;
            };
            // Don't steal keys from text inputs
            if let Some(target) = e.target()
                && target.dyn_ref::<web_sys::HtmlInputElement>().is_some()
            {
                return;
            }
            match e.key().as_str() {
                "+" | "=" => map.update(|engine| engine.zoom_in()),
                "-" => map.update(|engine| engine.zoom_out()),
                "0" => map.update(|engine| engine.reset_view()),
                "Escape" => map.update(|engine| engine.select(None)),
                _ => return,
            };
            e.prevent_default();
        });
    });

    view! {
        <div style="width: 100%; height: 100%; display: flex; font-family: 'Inter', system-ui, sans-serif;">
            <div style="flex: 1; min-width: 0; height: 100%; position: relative; overflow: hidden;">
                <MapCanvas />
                <FloorSwitcher />
                <ZoomControls />
            </div>
            <Sidebar />
        </div>
        <Toasts />
    }
}

#[component]
fn FloorSwitcher() -> impl IntoView {
    let map: MapHandle = expect_context();
    let floors = Memo::new(move |_| map.with(|engine| engine.floors()));
    let current = Memo::new(move |_| map.with(|engine| engine.current_floor()));

    view! {
        <div style="position: absolute; top: 16px; left: 16px; display: flex; flex-direction: column; gap: 6px; z-index: 5;">
            <For
                each=move || floors.get()
                key=|floor| *floor
                children=move |floor| {
                    view! {
                        <button
                            class="map-button"
                            class:active=move || current.get() == floor
                            title=format!("Floor {floor}")
                            on:click=move |_| map.apply(|engine| engine.change_floor(floor))
                        >
                            {floor.to_string()}
                        </button>
                    }
                }
            />
        </div>
    }
}

#[component]
fn ZoomControls() -> impl IntoView {
    let map: MapHandle = expect_context();

    view! {
        <div style="position: absolute; right: 16px; bottom: 16px; display: flex; flex-direction: column; gap: 6px; z-index: 5;">
            <button class="map-button" title="Zoom in" on:click=move |_| { map.update(|engine| engine.zoom_in()); }>"+"</button>
            <button class="map-button" title="Zoom out" on:click=move |_| { map.update(|engine| engine.zoom_out()); }>"\u{2212}"</button>
            <button class="map-button" title="Reset view" on:click=move |_| { map.update(|engine| engine.reset_view()); }>"\u{27F2}"</button>
            <button class="map-button" title="Fit floor" on:click=move |_| map.apply(|engine| engine.fit_floor())>"\u{2922}"</button>
        </div>
    }
}

#[component]
fn Toasts() -> impl IntoView {
    let notices: Notices = expect_context();

    view! {
        <div style="position: fixed; left: 50%; bottom: 24px; transform: translateX(-50%); display: flex; flex-direction: column; gap: 8px; z-index: 100; pointer-events: none;">
            <For
                each=move || notices.items()
                key=|notice| notice.id
                children=move |notice| {
                    let id = notice.id;
                    let background = match notice.kind {
                        NoticeKind::Info => "#2c3e50",
                        NoticeKind::Error => "#c0392b",
                    };
                    view! {
                        <div
                            class="toast-animate"
                            style=format!("pointer-events: auto; cursor: pointer; padding: 10px 16px; border-radius: 6px; color: #ffffff; font-size: 0.85rem; box-shadow: 0 4px 16px rgba(0,0,0,0.25); background: {background};")
                            on:click=move |_| notices.dismiss(id)
                        >
                            {notice.message}
                        </div>
                    }
                }
            />
        </div>
    }
}
