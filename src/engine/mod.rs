mod map_api;
mod map_session;
mod navigation_api;

pub use map_session::{MapHandle, MapSession};

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

use crate::{
    api::API,
    config::Config,
    entities::Screen,
    error::{invalid_state_error, Error},
    external::{google_maps::GoogleMaps, Directions, Geocoder},
    sources::{SimulatedLightSensor, SimulatedSources, SourceFactory},
};

/// Interval between simulated ambient light readings.
const LIGHT_READING_INTERVAL: Duration = Duration::from_secs(1);

enum ScreenState {
    Menu,
    Media,
    Map(MapSession),
}

impl ScreenState {
    fn screen(&self) -> Screen {
        match self {
            ScreenState::Menu => Screen::Menu,
            ScreenState::Media => Screen::Media,
            ScreenState::Map(_) => Screen::Map,
        }
    }
}

pub struct Engine {
    geocoder: Arc<dyn Geocoder>,
    directions: Arc<dyn Directions>,
    sources: Arc<dyn SourceFactory>,
    screen: Mutex<ScreenState>,
}

impl Engine {
    pub fn new(
        geocoder: Arc<dyn Geocoder>,
        directions: Arc<dyn Directions>,
        sources: Arc<dyn SourceFactory>,
    ) -> Self {
        Self {
            geocoder,
            directions,
            sources,
            screen: Mutex::new(ScreenState::Menu),
        }
    }

    /// Engine backed by Google Maps and simulated device sources.
    #[tracing::instrument(name = "Engine::from_config", skip_all)]
    pub fn from_config(config: &Config) -> Result<Self, Error> {
        let maps = Arc::new(GoogleMaps::new(config));
        let light_sensor = Arc::new(SimulatedLightSensor::new(
            config.light_mean,
            config.light_std_dev,
            LIGHT_READING_INTERVAL,
        )?);

        let sources = Arc::new(SimulatedSources {
            position: config.simulated_position,
            interval: config.location_interval,
            light_sensor,
        });

        Ok(Self::new(maps.clone(), maps, sources))
    }

    async fn map(&self) -> Result<MapHandle, Error> {
        match &*self.screen.lock().await {
            ScreenState::Map(session) => Ok(session.handle()),
            _ => Err(invalid_state_error()),
        }
    }
}

impl API for Engine {}
