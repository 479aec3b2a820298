mod coordinates;
mod fix;
mod map;
pub mod marker;
mod route;
mod screen;

pub use coordinates::Coordinates;
pub use fix::{Fix, Lux};
pub use map::{
    CameraPosition, MapSnapshot, MapState, MapStyle, RouteStatus, DARK_THRESHOLD,
    DEFAULT_LOCATION, DEFAULT_ZOOM, FOCUS_ZOOM,
};
pub use marker::Marker;
pub use route::Route;
pub use screen::{Navigation, Screen};
