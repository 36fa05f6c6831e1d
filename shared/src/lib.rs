pub mod api;
pub mod colors;
pub mod floor;
pub mod point;
pub mod route;
pub mod stats;

pub use floor::{Door, Floor, MapData, Room, Wall};
pub use point::{Category, DuplicateId, Point, search_points, validate_unique_ids};
pub use route::{Route, RouteError, RouteParams, RouteStep, build_route};
pub use stats::NavigationStats;
