use geo_types::Point;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinates {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// True when both axes are within `tolerance` degrees of `other`.
    pub fn approx_eq(&self, other: &Coordinates, tolerance: f64) -> bool {
        (self.lat - other.lat).abs() <= tolerance && (self.lng - other.lng).abs() <= tolerance
    }
}

impl From<Coordinates> for String {
    fn from(coordinates: Coordinates) -> Self {
        format!("{},{}", coordinates.lat, coordinates.lng)
    }
}

impl From<Coordinates> for Point<f64> {
    fn from(coordinates: Coordinates) -> Self {
        Point::new(coordinates.lng, coordinates.lat)
    }
}

impl From<Point<f64>> for Coordinates {
    fn from(point: Point<f64>) -> Self {
        Self {
            lat: point.y(),
            lng: point.x(),
        }
    }
}

#[test]
fn query_string_is_lat_then_lng() {
    let location: String = Coordinates::new(4.60971, -74.08175).into();
    assert_eq!(location, "4.60971,-74.08175");
}

#[test]
fn point_uses_lng_as_x() {
    let point: Point<f64> = Coordinates::new(38.5, -120.2).into();
    assert_eq!(point.x(), -120.2);
    assert_eq!(point.y(), 38.5);
    assert_eq!(Coordinates::from(point), Coordinates::new(38.5, -120.2));
}
