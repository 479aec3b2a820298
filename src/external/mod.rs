pub mod google_maps;

use async_trait::async_trait;

use crate::entities::{Coordinates, Route};
use crate::error::Error;

/// Directions service returning the route between two points. An empty
/// route means no route was found.
#[async_trait]
pub trait Directions: Send + Sync {
    async fn fetch_route(&self, origin: Coordinates, destination: Coordinates) -> Result<Route, Error>;
}

/// Best-match geocoding in both directions.
#[async_trait]
pub trait Geocoder: Send + Sync {
    async fn geocode(&self, query: &str) -> Result<Option<Coordinates>, Error>;
    async fn reverse_geocode(&self, coordinates: Coordinates) -> Result<Option<String>, Error>;
}
