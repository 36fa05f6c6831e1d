use std::cell::RefCell;
use std::rc::Rc;

use gloo_timers::callback::Timeout;
use leptos::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::spawn_local;

use wayfinder_shared::api::SearchHit;
use wayfinder_shared::{Category, Point, search_points};

use crate::api;
use crate::app::{MapHandle, Notices, RoutingSetting, ThemeSetting, request_route};
use crate::config::{RoutingMode, ThemePreset};

/// Result cap for the offline search fallback.
const LOCAL_SEARCH_LIMIT: usize = 20;

/// Places for the browse list: optionally one category, ordered by floor then name.
pub fn places_for(points: &[Point], filter: Option<Category>) -> Vec<SearchHit> {
    let mut places: Vec<SearchHit> = points
        .iter()
        .filter(|p| filter.is_none_or(|category| p.category == category))
        .map(SearchHit::from)
        .collect();
    places.sort_by(|a, b| a.floor.cmp(&b.floor).then_with(|| a.name.cmp(&b.name)));
    places
}

fn input_value(e: &leptos::ev::Event) -> Option<String> {
    let target = e.target()?;
    if let Some(input) = target.dyn_ref::<web_sys::HtmlInputElement>() {
        return Some(input.value());
    }
    target
        .dyn_ref::<web_sys::HtmlSelectElement>()
        .map(|select| select.value())
}

/// Select a place and bring it into view on its floor.
fn focus_place(map: MapHandle, id: &str) {
    map.update(|engine| {
        engine.select(Some(id.to_string()));
        engine.center_on_point(id);
    });
}

#[component]
pub fn Sidebar() -> impl IntoView {
    let map: MapHandle = expect_context();
    let has_selection = Memo::new(move |_| map.with(|engine| engine.selected_point().is_some()));

    view! {
        <div
            class="sidebar-inner scrollbar-thin"
            style="width: 340px; flex-shrink: 0; height: 100%; overflow-y: auto; background: #ffffff; border-left: 1px solid #dfe4ea; display: flex; flex-direction: column;"
        >
            <div style="padding: 18px 20px 12px; border-bottom: 1px solid #dfe4ea;">
                <div style="font-size: 1.1rem; font-weight: 700; color: #2c3e50;">"Wayfinder"</div>
                <div style="font-size: 0.75rem; color: #7f8c8d; margin-top: 2px;">"Indoor map and routes"</div>
            </div>
            <SearchBox />
            {move || has_selection.get().then(|| view! { <PointBalloon /> })}
            <RouteCard />
            <PlacesList />
            <SettingsPanel />
        </div>
    }
}

#[component]
fn SearchBox() -> impl IntoView {
    let map: MapHandle = expect_context();
    let query = RwSignal::new(String::new());
    let results: RwSignal<Vec<SearchHit>> = RwSignal::new(Vec::new());
    let search_seq = StoredValue::new(0u64);

    // Hold the timeout handle so a new keystroke cancels the pending query
    let debounce_timeout = Rc::new(RefCell::new(None::<Timeout>));

    let on_input = {
        let debounce_timeout = Rc::clone(&debounce_timeout);
        move |e: leptos::ev::Event| {
            let Some(value) = input_value(&e) else {
                return;
            };
            query.set(value.clone());
            if let Some(timeout) = debounce_timeout.borrow_mut().take() {
                timeout.cancel();
            }
            let (min_chars, debounce_ms) = map.with_untracked(|engine| {
                (engine.config().search_min_chars, engine.config().search_debounce_ms)
            });
            let seq = search_seq.try_update_value(|s| {
                *s += 1;
                *s
            });
            if value.trim().chars().count() < min_chars {
                results.set(Vec::new());
                return;
            }
            let timeout = Timeout::new(debounce_ms, move || {
                spawn_local(async move {
                    let hits = match api::search(&value).await {
                        Ok(hits) => hits,
                        Err(err) => {
                            web_sys::console::warn_1(
                                &format!("search failed, using local points: {err}").into(),
                            );
                            map.with_untracked(|engine| {
                                search_points(engine.points(), &value, min_chars, LOCAL_SEARCH_LIMIT)
                                    .into_iter()
                                    .map(SearchHit::from)
                                    .collect()
                            })
                        }
                    };
                    // Drop responses that were overtaken by a newer query
                    if search_seq.try_get_value() == seq {
                        results.set(hits);
                    }
                });
            });
            *debounce_timeout.borrow_mut() = Some(timeout);
        }
    };

    view! {
        <div style="padding: 12px 20px; border-bottom: 1px solid #dfe4ea;">
            <input
                data-search-input=""
                class="focus-ring"
                style="width: 100%; padding: 9px 12px; border: 1px solid #dfe4ea; border-radius: 6px; font-size: 0.9rem; outline: none;"
                type="text"
                placeholder="Search places..."
                prop:value=move || query.get()
                on:input=on_input
            />
            <div style="margin-top: 6px;">
                <For
                    each=move || results.get()
                    key=|hit| hit.id.clone()
                    children=move |hit| {
                        let id = hit.id.clone();
                        view! {
                            <div
                                class="list-row"
                                style="display: flex; justify-content: space-between; padding: 6px 8px; border-radius: 4px; cursor: pointer; font-size: 0.85rem;"
                                on:click=move |_| {
                                    focus_place(map, &id);
                                    results.set(Vec::new());
                                }
                            >
                                <span style="color: #2c3e50;">{hit.name}</span>
                                <span style="color: #95a5a6;">{format!("{} \u{00B7} floor {}", hit.category.label(), hit.floor)}</span>
                            </div>
                        }
                    }
                />
            </div>
        </div>
    }
}

#[component]
fn PointBalloon() -> impl IntoView {
    let map: MapHandle = expect_context();
    let selected = Memo::new(move |_| map.with(|engine| engine.selected_point().cloned()));

    view! {
        {move || selected.get().map(|point| {
            let id_from = point.id.clone();
            let id_to = point.id.clone();
            let id_center = point.id.clone();
            let description = (!point.description.is_empty()).then(|| point.description.clone());
            view! {
                <div style="margin: 12px 20px 0; padding: 12px 14px; border: 1px solid #dfe4ea; border-radius: 8px; box-shadow: 0 2px 8px rgba(0,0,0,0.06);">
                    <div style="display: flex; justify-content: space-between; align-items: baseline;">
                        <div style="font-weight: 700; color: #2c3e50;">{point.name.clone()}</div>
                        <button
                            class="link-button"
                            title="Close"
                            on:click=move |_| { map.update(|engine| engine.select(None)); }
                        >"\u{00D7}"</button>
                    </div>
                    <div style="font-size: 0.78rem; color: #7f8c8d; margin-top: 2px;">
                        {format!("{} \u{00B7} floor {}", point.category.label(), point.floor)}
                    </div>
                    {description.map(|text| view! {
                        <div style="font-size: 0.82rem; color: #34495e; margin-top: 6px;">{text}</div>
                    })}
                    <div style="display: flex; gap: 6px; margin-top: 10px;">
                        <button class="pill-button" on:click=move |_| { map.update(|engine| engine.set_start(&id_from)); }>"From here"</button>
                        <button class="pill-button" on:click=move |_| { map.update(|engine| engine.set_end(&id_to)); }>"To here"</button>
                        <button class="pill-button" on:click=move |_| { map.update(|engine| engine.center_on_point(&id_center)); }>"Center"</button>
                    </div>
                </div>
            }
        })}
    }
}

#[component]
fn RouteCard() -> impl IntoView {
    let map: MapHandle = expect_context();
    let notices: Notices = expect_context();
    let RoutingSetting(routing_mode) = expect_context();

    let endpoints = Memo::new(move |_| {
        map.with(|engine| {
            (
                engine.start_point().map(|p| p.name.clone()),
                engine.end_point().map(|p| p.name.clone()),
            )
        })
    });
    let summary = Memo::new(move |_| {
        map.with(|engine| {
            engine.route().map(|route| {
                let steps: Vec<String> = route
                    .steps
                    .iter()
                    .map(|step| step.describe(&route.waypoints))
                    .collect();
                (
                    route.total_distance_meters,
                    route.eta_minutes,
                    route.floor_changes(),
                    steps,
                )
            })
        })
    });

    let endpoint_row = move |label: &'static str, is_start: bool| {
        view! {
            <div style="display: flex; justify-content: space-between; align-items: center; font-size: 0.85rem; padding: 3px 0;">
                <span style="color: #7f8c8d; width: 40px;">{label}</span>
                <span style="flex: 1; color: #2c3e50;">
                    {move || {
                        let (start, end) = endpoints.get();
                        let name = if is_start { start } else { end };
                        name.unwrap_or_else(|| "not set".to_string())
                    }}
                </span>
                <button
                    class="link-button"
                    title="Clear"
                    on:click=move |_| {
                        map.update(|engine| if is_start { engine.clear_start() } else { engine.clear_end() });
                    }
                >"\u{00D7}"</button>
            </div>
        }
    };

    view! {
        <div style="margin: 12px 20px 0; padding: 12px 14px; background: #f8f9fa; border-radius: 8px;">
            <div style="font-size: 0.72rem; text-transform: uppercase; letter-spacing: 0.08em; color: #95a5a6; margin-bottom: 6px;">"Route"</div>
            {endpoint_row("From", true)}
            {endpoint_row("To", false)}
            <div style="display: flex; gap: 6px; margin-top: 8px;">
                <button class="pill-button primary" on:click=move |_| request_route(map, notices, routing_mode.get_untracked())>"Build route"</button>
                <button class="pill-button" title="Swap" on:click=move |_| { map.update(|engine| engine.swap_endpoints()); }>"\u{21C5}"</button>
                <button class="pill-button" on:click=move |_| { map.update(|engine| engine.clear_route()); }>"Clear"</button>
            </div>
            {move || summary.get().map(|(meters, minutes, floor_changes, steps)| view! {
                <div style="margin-top: 10px; padding-top: 8px; border-top: 1px solid #dfe4ea; font-size: 0.82rem; color: #2c3e50;">
                    <div style="display: flex; gap: 12px; font-weight: 600;">
                        <span>{format!("{meters:.0} m")}</span>
                        <span>{format!("~{minutes} min")}</span>
                        {(floor_changes > 0).then(|| view! {
                            <span>{format!("{floor_changes} floor change(s)")}</span>
                        })}
                    </div>
                    <ol style="margin: 6px 0 0; padding-left: 18px; color: #34495e;">
                        {steps.into_iter().map(|step| view! { <li>{step}</li> }).collect_view()}
                    </ol>
                </div>
            })}
        </div>
    }
}

#[component]
fn PlacesList() -> impl IntoView {
    let map: MapHandle = expect_context();
    let filter: RwSignal<Option<Category>> = RwSignal::new(None);

    let places = Memo::new(move |_| {
        let filter = filter.get();
        map.with(|engine| places_for(engine.points(), filter))
    });

    let on_filter = move |e: leptos::ev::Event| {
        let Some(value) = input_value(&e) else {
            return;
        };
        filter.set(Category::ALL.into_iter().find(|c| c.label() == value));
    };

    view! {
        <div style="margin: 12px 20px 0;">
            <div style="display: flex; justify-content: space-between; align-items: center; margin-bottom: 6px;">
                <span style="font-size: 0.72rem; text-transform: uppercase; letter-spacing: 0.08em; color: #95a5a6;">"Places"</span>
                <select style="font-size: 0.8rem;" on:change=on_filter>
                    <option value="" selected=true>"All"</option>
                    {Category::ALL
                        .into_iter()
                        .map(|c| view! { <option value=c.label()>{c.label()}</option> })
                        .collect_view()}
                </select>
            </div>
            <For
                each=move || places.get()
                key=|place| place.id.clone()
                children=move |place| {
                    let id = place.id.clone();
                    view! {
                        <div
                            class="list-row"
                            style="display: flex; justify-content: space-between; padding: 5px 8px; border-radius: 4px; cursor: pointer; font-size: 0.85rem;"
                            on:click=move |_| focus_place(map, &id)
                        >
                            <span style="color: #2c3e50;">{place.name}</span>
                            <span style="color: #95a5a6;">{format!("F{}", place.floor)}</span>
                        </div>
                    }
                }
            />
        </div>
    }
}

#[component]
fn SettingsPanel() -> impl IntoView {
    let ThemeSetting(theme) = expect_context();
    let RoutingSetting(routing) = expect_context();

    let on_theme = move |e: leptos::ev::Event| {
        if let Some(preset) = input_value(&e).and_then(|key| ThemePreset::from_key(&key)) {
            theme.set(preset);
        }
    };
    let on_routing = move |e: leptos::ev::Event| {
        let mode = match input_value(&e).as_deref() {
            Some("server") => RoutingMode::Server,
            _ => RoutingMode::Local,
        };
        routing.set(mode);
    };

    view! {
        <div style="margin: 16px 20px 20px; padding-top: 12px; border-top: 1px solid #dfe4ea; display: flex; flex-direction: column; gap: 8px; font-size: 0.85rem; color: #2c3e50;">
            <label style="display: flex; justify-content: space-between; align-items: center;">
                "Map style"
                <select on:change=on_theme>
                    {ThemePreset::ALL
                        .into_iter()
                        .map(|preset| view! {
                            <option value=preset.key() selected=move || theme.get() == preset>{preset.label()}</option>
                        })
                        .collect_view()}
                </select>
            </label>
            <label style="display: flex; justify-content: space-between; align-items: center;">
                "Routing"
                <select on:change=on_routing>
                    <option value="local" selected=move || routing.get() == RoutingMode::Local>{RoutingMode::Local.label()}</option>
                    <option value="server" selected=move || routing.get() == RoutingMode::Server>{RoutingMode::Server.label()}</option>
                </select>
            </label>
        </div>
    }
}
