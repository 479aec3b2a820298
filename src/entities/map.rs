use serde::{Deserialize, Serialize};

use crate::entities::{
    marker::{CURRENT_LOCATION_TITLE, SEARCH_RESULT_TITLE},
    Coordinates, Fix, Lux, Marker, Route,
};
use crate::polyline;

pub const DEFAULT_LOCATION: Coordinates = Coordinates {
    lat: 4.60971,
    lng: -74.08175,
};
pub const DEFAULT_ZOOM: f32 = 15.0;
pub const FOCUS_ZOOM: f32 = 16.0;
pub const INITIAL_AMBIENT_LIGHT: Lux = 100.0;
pub const DARK_THRESHOLD: Lux = 10.0;

const DARK_STYLE_JSON: &str =
    r#"[{"elementType": "geometry", "stylers": [{"saturation": -100}, {"lightness": -30}]}]"#;
const NORMAL_STYLE_JSON: &str = "[]";

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct CameraPosition {
    pub target: Coordinates,
    pub zoom: f32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MapStyle {
    Normal,
    Dark,
}

impl MapStyle {
    pub fn for_light(lux: Lux) -> Self {
        if lux < DARK_THRESHOLD {
            MapStyle::Dark
        } else {
            MapStyle::Normal
        }
    }

    pub fn style_json(&self) -> &'static str {
        match self {
            MapStyle::Normal => NORMAL_STYLE_JSON,
            MapStyle::Dark => DARK_STYLE_JSON,
        }
    }
}

/// Directions shown on the map. `Ready` with an empty route means the
/// service found no route; `Unavailable` means the fetch itself failed.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "name", rename_all = "snake_case")]
pub enum RouteStatus {
    Idle,
    Pending,
    Ready { route: Route },
    Unavailable,
}

#[derive(Clone, Debug)]
pub struct MapState {
    pub current_location: Coordinates,
    pub trail: Route,
    pub searched_location: Option<Coordinates>,
    pub markers: Vec<Marker>,
    pub tracking: bool,
    pub camera: CameraPosition,
    pub ambient_light: Lux,
    pub directions: RouteStatus,
    route_generation: u64,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MapSnapshot {
    pub current_location: Coordinates,
    pub camera: CameraPosition,
    pub tracking: bool,
    pub ambient_light: Lux,
    pub style: MapStyle,
    pub style_json: String,
    pub markers: Vec<Marker>,
    pub trail: Option<Vec<Coordinates>>,
    pub directions: RouteStatus,
    /// The ready directions route as an encoded polyline.
    pub encoded_directions: Option<String>,
}

impl Default for MapState {
    fn default() -> Self {
        Self::new(DEFAULT_LOCATION)
    }
}

impl MapState {
    pub fn new(initial: Coordinates) -> Self {
        Self {
            current_location: initial,
            trail: Route::default(),
            searched_location: None,
            markers: vec![],
            tracking: false,
            camera: CameraPosition {
                target: initial,
                zoom: DEFAULT_ZOOM,
            },
            ambient_light: INITIAL_AMBIENT_LIGHT,
            directions: RouteStatus::Idle,
            route_generation: 0,
        }
    }

    fn focus(&mut self, target: Coordinates) {
        self.camera = CameraPosition {
            target,
            zoom: FOCUS_ZOOM,
        };
    }

    pub fn apply_fix(&mut self, fix: &Fix) {
        self.current_location = fix.coordinates;
        self.trail.push(fix.coordinates);

        if self.tracking {
            self.focus(fix.coordinates);
        }
    }

    pub fn apply_light(&mut self, lux: Lux) {
        self.ambient_light = lux;
    }

    pub fn style(&self) -> MapStyle {
        MapStyle::for_light(self.ambient_light)
    }

    pub fn set_tracking(&mut self, enabled: bool) {
        self.tracking = enabled;

        if enabled {
            self.focus(self.current_location);
        }
    }

    pub fn show_search_result(&mut self, position: Coordinates) {
        self.searched_location = Some(position);
        self.tracking = false;
        self.focus(position);
    }

    pub fn add_marker(&mut self, position: Coordinates, title: String) -> Marker {
        let marker = Marker::new(position, title);
        self.markers.push(marker.clone());
        self.focus(position);

        marker
    }

    /// Marks a new route request as the latest and returns its generation.
    pub fn begin_route_request(&mut self) -> u64 {
        self.route_generation += 1;
        self.directions = RouteStatus::Pending;

        self.route_generation
    }

    /// Applies a fetch result if it belongs to the latest request.
    pub fn finish_route_request(&mut self, generation: u64, status: RouteStatus) -> bool {
        if generation != self.route_generation {
            tracing::debug!(
                "discarding stale route result {} (latest {})",
                generation,
                self.route_generation
            );
            return false;
        }

        self.directions = status;
        true
    }

    pub fn rendered_markers(&self) -> Vec<Marker> {
        let mut markers = vec![Marker::new(self.current_location, CURRENT_LOCATION_TITLE)];

        if let Some(position) = self.searched_location {
            markers.push(Marker::new(position, SEARCH_RESULT_TITLE));
        }

        markers.extend(self.markers.iter().cloned());
        markers
    }

    pub fn snapshot(&self) -> MapSnapshot {
        let style = self.style();

        MapSnapshot {
            current_location: self.current_location,
            camera: self.camera,
            tracking: self.tracking,
            ambient_light: self.ambient_light,
            style,
            style_json: style.style_json().into(),
            markers: self.rendered_markers(),
            trail: self.trail.path().map(|_| self.trail.points.clone()),
            directions: self.directions.clone(),
            encoded_directions: match &self.directions {
                RouteStatus::Ready { route } => Some(polyline::encode(route)),
                _ => None,
            },
        }
    }
}

#[test]
fn starts_at_default_location() {
    let state = MapState::default();

    assert_eq!(state.camera.target, DEFAULT_LOCATION);
    assert_eq!(state.camera.zoom, DEFAULT_ZOOM);
    assert_eq!(state.style(), MapStyle::Normal);
    assert_eq!(state.directions, RouteStatus::Idle);
}

#[test]
fn fixes_extend_the_trail_and_follow_when_tracking() {
    let mut state = MapState::default();
    let first = Fix::now(Coordinates::new(4.61, -74.08));
    let second = Fix::now(Coordinates::new(4.62, -74.07));

    state.apply_fix(&first);
    assert_eq!(state.current_location, first.coordinates);
    assert_eq!(state.camera.target, DEFAULT_LOCATION);
    assert!(state.snapshot().trail.is_none());

    state.set_tracking(true);
    assert_eq!(state.camera.target, first.coordinates);
    assert_eq!(state.camera.zoom, FOCUS_ZOOM);

    state.apply_fix(&second);
    assert_eq!(state.camera.target, second.coordinates);
    assert_eq!(
        state.snapshot().trail,
        Some(vec![first.coordinates, second.coordinates])
    );
}

#[test]
fn darkens_below_threshold() {
    let mut state = MapState::default();

    state.apply_light(9.9);
    assert_eq!(state.style(), MapStyle::Dark);
    assert!(state.snapshot().style_json.contains("saturation"));

    state.apply_light(DARK_THRESHOLD);
    assert_eq!(state.style(), MapStyle::Normal);
    assert_eq!(state.snapshot().style_json, "[]");
}

#[test]
fn search_result_stops_tracking() {
    let mut state = MapState::default();
    state.set_tracking(true);

    let found = Coordinates::new(4.65, -74.05);
    state.show_search_result(found);

    assert!(!state.tracking);
    assert_eq!(state.camera.target, found);

    let markers = state.rendered_markers();
    assert_eq!(markers.len(), 2);
    assert_eq!(markers[1].title, SEARCH_RESULT_TITLE);
}

#[test]
fn only_latest_route_request_is_applied() {
    let mut state = MapState::default();

    let stale = state.begin_route_request();
    let latest = state.begin_route_request();
    assert_eq!(state.directions, RouteStatus::Pending);

    assert!(state.finish_route_request(latest, RouteStatus::Unavailable));
    assert!(!state.finish_route_request(
        stale,
        RouteStatus::Ready {
            route: Route::default()
        }
    ));
    assert_eq!(state.directions, RouteStatus::Unavailable);
}

#[test]
fn ready_directions_are_also_encoded() {
    let mut state = MapState::default();
    assert_eq!(state.snapshot().encoded_directions, None);

    let generation = state.begin_route_request();
    assert_eq!(state.snapshot().encoded_directions, None);

    let route = Route::new(vec![
        Coordinates::new(38.5, -120.2),
        Coordinates::new(40.7, -120.95),
        Coordinates::new(43.252, -126.453),
    ]);
    state.finish_route_request(generation, RouteStatus::Ready { route });

    assert_eq!(
        state.snapshot().encoded_directions.as_deref(),
        Some("_p~iF~ps|U_ulLnnqC_mqNvxq`@")
    );
}
