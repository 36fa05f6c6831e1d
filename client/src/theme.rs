use wayfinder_shared::Category;
use wayfinder_shared::colors::darken;

use crate::config::ThemePreset;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CategoryStyle {
    pub color: &'static str,
    pub glyph: &'static str,
}

/// Per-category marker colors. Glyphs are shared by every preset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CategoryPalette {
    pub classroom: &'static str,
    pub entrance: &'static str,
    pub exit: &'static str,
    pub toilet: &'static str,
    pub stair: &'static str,
    pub elevator: &'static str,
    pub cafeteria: &'static str,
    pub hall: &'static str,
    pub library: &'static str,
    pub gym: &'static str,
    pub office: &'static str,
    pub medical: &'static str,
    pub other: &'static str,
}

impl CategoryPalette {
    pub fn style(&self, category: Category) -> CategoryStyle {
        let (color, glyph) = match category {
            Category::Classroom => (self.classroom, "📚"),
            Category::Entrance => (self.entrance, "🚪"),
            Category::Exit => (self.exit, "🚪"),
            Category::Toilet => (self.toilet, "🚻"),
            Category::Stair => (self.stair, "⬆️"),
            Category::Elevator => (self.elevator, "🛗"),
            Category::Cafeteria => (self.cafeteria, "🍽️"),
            Category::Hall => (self.hall, "🏛️"),
            Category::Library => (self.library, "📖"),
            Category::Gym => (self.gym, "🏀"),
            Category::Office => (self.office, "💼"),
            Category::Medical => (self.medical, "⚕️"),
            Category::Other => (self.other, "📍"),
        };
        CategoryStyle { color, glyph }
    }
}

/// Every color the renderer uses. Presets differ only in these values.
#[derive(Debug, Clone, PartialEq)]
pub struct Theme {
    pub name: &'static str,
    pub background: &'static str,
    pub grid: &'static str,
    pub wall: &'static str,
    pub room_fill_alpha: f64,
    pub room_text: &'static str,
    pub door: &'static str,
    pub text: &'static str,
    pub text_halo: &'static str,
    pub route: &'static str,
    pub route_arrow: &'static str,
    pub start: &'static str,
    pub end: &'static str,
    pub selection: &'static str,
    pub point_stroke: &'static str,
    pub placeholder: &'static str,
    pub categories: CategoryPalette,
    /// Draw the route as smooth curves instead of a dashed polyline.
    pub route_curved: bool,
    /// Shade point markers with a radial gradient.
    pub point_gradient: bool,
}

impl Theme {
    pub fn from_preset(preset: ThemePreset) -> Self {
        match preset {
            ThemePreset::Classic => Self::classic(),
            ThemePreset::City => Self::city(),
            ThemePreset::Material => Self::material(),
        }
    }

    pub fn classic() -> Self {
        Self {
            name: "classic",
            background: "#ffffff",
            grid: "#ecf0f1",
            wall: "#2c3e50",
            room_fill_alpha: 0.125,
            room_text: "#2c3e50",
            door: "#e67e22",
            text: "#2c3e50",
            text_halo: "#ffffff",
            route: "#e74c3c",
            route_arrow: "#c0392b",
            start: "#27ae60",
            end: "#e74c3c",
            selection: "#f1c40f",
            point_stroke: "#ffffff",
            placeholder: "#95a5a6",
            categories: CategoryPalette {
                classroom: "#3498db",
                entrance: "#27ae60",
                exit: "#16a085",
                toilet: "#e67e22",
                stair: "#9b59b6",
                elevator: "#f1c40f",
                cafeteria: "#e74c3c",
                hall: "#1abc9c",
                library: "#8e44ad",
                gym: "#d35400",
                office: "#34495e",
                medical: "#c0392b",
                other: "#95a5a6",
            },
            route_curved: false,
            point_gradient: false,
        }
    }

    pub fn city() -> Self {
        Self {
            name: "city",
            background: "#f8f8f8",
            grid: "#e5e5e5",
            wall: "#2c3e50",
            room_fill_alpha: 0.125,
            room_text: "#1c1c1e",
            door: "#8e8e93",
            text: "#1c1c1e",
            text_halo: "#ffffff",
            route: "#1e98ff",
            route_arrow: "#1e98ff",
            start: "#34c759",
            end: "#ff3b30",
            selection: "#ffcc00",
            point_stroke: "#ffffff",
            placeholder: "#8e8e93",
            categories: CategoryPalette {
                classroom: "#1e98ff",
                entrance: "#34c759",
                exit: "#30b0c7",
                toilet: "#ff9f0a",
                stair: "#af52de",
                elevator: "#5856d6",
                cafeteria: "#ff3b30",
                hall: "#8e8e93",
                library: "#a2845e",
                gym: "#ff2d55",
                office: "#636366",
                medical: "#ff453a",
                other: "#8e8e93",
            },
            route_curved: false,
            point_gradient: false,
        }
    }

    pub fn material() -> Self {
        Self {
            name: "material",
            background: "#ffffff",
            grid: "#e5e5e5",
            wall: "#dadce0",
            room_fill_alpha: 0.25,
            room_text: "#3c4043",
            door: "#9aa0a6",
            text: "#3c4043",
            text_halo: "#ffffff",
            route: "#1a73e8",
            route_arrow: "#1a73e8",
            start: "#34a853",
            end: "#e5252d",
            selection: "#fbbc04",
            point_stroke: "#ffffff",
            placeholder: "#9aa0a6",
            categories: CategoryPalette {
                classroom: "#1a73e8",
                entrance: "#34a853",
                exit: "#188038",
                toilet: "#f9ab00",
                stair: "#9334e8",
                elevator: "#e8710a",
                cafeteria: "#e5252d",
                hall: "#0d652d",
                library: "#a142f4",
                gym: "#d93025",
                office: "#5f6368",
                medical: "#c5221f",
                other: "#9aa0a6",
            },
            route_curved: true,
            point_gradient: true,
        }
    }

    pub fn category(&self, category: Category) -> CategoryStyle {
        self.categories.style(category)
    }

    /// Outline for a category marker, a darker shade of its fill.
    pub fn category_outline(&self, category: Category) -> String {
        darken(self.category(category).color, 0.15)
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::classic()
    }
}
