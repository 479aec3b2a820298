use geo_types::{Coord, LineString};
use serde::{Deserialize, Serialize};

use crate::entities::Coordinates;

/// Ordered path from origin to destination. Consecutive points may coincide.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Route {
    pub points: Vec<Coordinates>,
}

impl Route {
    pub fn new(points: Vec<Coordinates>) -> Self {
        Self { points }
    }

    pub fn push(&mut self, point: Coordinates) {
        self.points.push(point);
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// The drawable path, if any. Routes with fewer than two points are
    /// valid but never render a segment.
    pub fn path(&self) -> Option<LineString<f64>> {
        if self.points.len() < 2 {
            return None;
        }

        Some(self.into())
    }
}

impl From<&Route> for LineString<f64> {
    fn from(route: &Route) -> Self {
        route
            .points
            .iter()
            .map(|point| Coord {
                x: point.lng,
                y: point.lat,
            })
            .collect::<Vec<_>>()
            .into()
    }
}

impl From<LineString<f64>> for Route {
    fn from(line: LineString<f64>) -> Self {
        Self {
            points: line
                .into_points()
                .into_iter()
                .map(Coordinates::from)
                .collect(),
        }
    }
}

#[test]
fn degenerate_routes_have_no_path() {
    let mut route = Route::default();
    assert!(route.path().is_none());

    route.push(Coordinates::new(4.6, -74.0));
    assert!(route.path().is_none());

    route.push(Coordinates::new(4.6, -74.0));
    let path = route.path().unwrap();
    assert_eq!(path.0.len(), 2);
}

#[test]
fn line_string_keeps_path_order() {
    let route = Route::new(vec![
        Coordinates::new(38.5, -120.2),
        Coordinates::new(40.7, -120.95),
    ]);

    let line: LineString<f64> = (&route).into();
    assert_eq!(line.0[0], Coord { x: -120.2, y: 38.5 });
    assert_eq!(Route::from(line), route);
}
