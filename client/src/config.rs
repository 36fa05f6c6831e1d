use gloo_storage::Storage;
use serde::{Deserialize, Serialize};
use wayfinder_shared::RouteParams;

pub const SETTINGS_KEY: &str = "wayfinder_settings";

/// Tunables for the viewport, hit-testing and route rendering.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    pub min_scale: f64,
    pub max_scale: f64,
    pub wheel_zoom_in: f64,
    pub wheel_zoom_out: f64,
    pub button_zoom: f64,
    /// Hover radius in screen pixels.
    pub hit_threshold_px: f64,
    /// Click/tap selection radius in screen pixels.
    pub click_threshold_px: f64,
    /// Pointer travel below this is a click, not a drag.
    pub drag_slop_px: f64,
    pub grid_step: f64,
    pub grid_line_px: f64,
    pub label_min_scale: f64,
    pub arrow_min_segment: f64,
    pub arrow_position: f64,
    pub search_debounce_ms: u32,
    pub search_min_chars: usize,
    pub route: RouteParams,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            min_scale: 0.5,
            max_scale: 3.0,
            wheel_zoom_in: 1.1,
            wheel_zoom_out: 0.9,
            button_zoom: 1.2,
            hit_threshold_px: 20.0,
            click_threshold_px: 30.0,
            drag_slop_px: 5.0,
            grid_step: 50.0,
            grid_line_px: 1.0,
            label_min_scale: 0.8,
            arrow_min_segment: 50.0,
            arrow_position: 0.7,
            search_debounce_ms: 300,
            search_min_chars: 2,
            route: RouteParams::default(),
        }
    }
}

impl EngineConfig {
    pub fn from_settings(settings: &Settings) -> Self {
        let mut config = Self::default();
        if let Some(speed) = settings.walk_speed_m_per_min {
            config.route = config.route.with_walk_speed(speed);
        }
        config
    }
}

/// Where routes are computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoutingMode {
    #[default]
    Local,
    Server,
}

impl RoutingMode {
    pub fn label(self) -> &'static str {
        match self {
            RoutingMode::Local => "On device",
            RoutingMode::Server => "Server",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThemePreset {
    #[default]
    Classic,
    City,
    Material,
}

impl ThemePreset {
    pub const ALL: [ThemePreset; 3] = [ThemePreset::Classic, ThemePreset::City, ThemePreset::Material];

    pub fn label(self) -> &'static str {
        match self {
            ThemePreset::Classic => "Classic",
            ThemePreset::City => "City",
            ThemePreset::Material => "Material",
        }
    }

    pub fn key(self) -> &'static str {
        match self {
            ThemePreset::Classic => "classic",
            ThemePreset::City => "city",
            ThemePreset::Material => "material",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|preset| preset.key() == key)
    }
}

/// User preferences persisted to localStorage.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub theme: ThemePreset,
    pub routing: RoutingMode,
    pub walk_speed_m_per_min: Option<f64>,
}

impl Settings {
    pub fn load() -> Self {
        gloo_storage::LocalStorage::get(SETTINGS_KEY).unwrap_or_default()
    }

    pub fn save(&self) {
        if let Err(e) = gloo_storage::LocalStorage::set(SETTINGS_KEY, self) {
            web_sys::console::warn_1(&format!("failed to persist settings: {e}").into());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn settings_fill_missing_fields_with_defaults() {
        let settings: Settings = serde_json::from_str(r#"{"routing":"server"}"#).expect("parse");
        assert_eq!(settings.routing, RoutingMode::Server);
        assert_eq!(settings.theme, ThemePreset::Classic);
        assert!(settings.walk_speed_m_per_min.is_none());
    }

    #[test]
    fn walk_speed_override_reaches_route_params() {
        let settings = Settings {
            walk_speed_m_per_min: Some(80.0),
            ..Settings::default()
        };
        assert_eq!(EngineConfig::from_settings(&settings).route.walk_speed_m_per_min, 80.0);
        assert_eq!(
            EngineConfig::from_settings(&Settings::default()).route.walk_speed_m_per_min,
            70.0
        );
    }

    #[test]
    fn theme_preset_keys_roundtrip() {
        for preset in ThemePreset::ALL {
            assert_eq!(ThemePreset::from_key(preset.key()), Some(preset));
        }
        assert_eq!(ThemePreset::from_key("neon"), None);
    }
}
