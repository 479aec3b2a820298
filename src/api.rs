use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::entities::{Coordinates, MapSnapshot, Marker, Navigation, Screen};
use crate::error::Error;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "name", rename_all = "snake_case")]
pub enum SearchOutcome {
    Found { position: Coordinates },
    NotFound { message: String },
}

#[async_trait]
pub trait NavigationAPI {
    async fn current_screen(&self) -> Screen;
    async fn navigate(&self, navigation: Navigation) -> Result<Screen, Error>;
}

#[async_trait]
pub trait MapAPI {
    async fn map_snapshot(&self) -> Result<MapSnapshot, Error>;
    async fn set_tracking(&self, enabled: bool) -> Result<MapSnapshot, Error>;
    async fn search(&self, query: String) -> Result<SearchOutcome, Error>;
    async fn long_press(&self, position: Coordinates) -> Result<Marker, Error>;
    async fn request_route(
        &self,
        origin: Option<Coordinates>,
        destination: Coordinates,
    ) -> Result<(), Error>;
}

pub trait API: NavigationAPI + MapAPI {}

pub type DynAPI = Arc<dyn API + Send + Sync>;
