use super::{Engine, ScreenState};

use async_trait::async_trait;

use crate::{
    api::NavigationAPI,
    entities::{Navigation, Screen},
    error::Error,
};

#[async_trait]
impl NavigationAPI for Engine {
    async fn current_screen(&self) -> Screen {
        self.screen.lock().await.screen()
    }

    #[tracing::instrument(skip(self))]
    async fn navigate(&self, navigation: Navigation) -> Result<Screen, Error> {
        let mut state = self.screen.lock().await;
        let next = state.screen().navigate(navigation)?;

        // replacing the state drops a map session being left
        *state = match next {
            Screen::Menu => ScreenState::Menu,
            Screen::Media => ScreenState::Media,
            Screen::Map => ScreenState::Map(super::MapSession::start(
                self.sources.as_ref(),
                self.geocoder.clone(),
                self.directions.clone(),
            )),
        };

        tracing::info!("navigated to {:?}", next);

        Ok(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;

    use crate::{
        api::MapAPI,
        entities::{Coordinates, Route},
        external::{Directions, Geocoder},
        sources::{SimulatedLightSensor, SimulatedSources},
    };

    struct Offline;

    #[async_trait]
    impl Geocoder for Offline {
        async fn geocode(&self, _: &str) -> Result<Option<Coordinates>, Error> {
            Ok(None)
        }

        async fn reverse_geocode(&self, _: Coordinates) -> Result<Option<String>, Error> {
            Ok(None)
        }
    }

    #[async_trait]
    impl Directions for Offline {
        async fn fetch_route(&self, _: Coordinates, _: Coordinates) -> Result<Route, Error> {
            Ok(Route::default())
        }
    }

    fn engine() -> (Engine, Arc<SimulatedLightSensor>) {
        let light_sensor =
            Arc::new(SimulatedLightSensor::new(50.0, 0.0, Duration::from_millis(10)).unwrap());
        let sources = Arc::new(SimulatedSources {
            position: Coordinates::new(4.6, -74.1),
            interval: Duration::from_millis(10),
            light_sensor: light_sensor.clone(),
        });

        (
            Engine::new(Arc::new(Offline), Arc::new(Offline), sources),
            light_sensor,
        )
    }

    #[tokio::test]
    async fn map_operations_require_map_screen() {
        let (engine, _) = engine();

        assert_eq!(engine.current_screen().await, Screen::Menu);
        assert_eq!(engine.map_snapshot().await.unwrap_err().code, 100);

        engine.navigate(Navigation::OpenCamera).await.unwrap();
        assert_eq!(engine.current_screen().await, Screen::Media);
        assert_eq!(engine.set_tracking(true).await.unwrap_err().code, 100);
    }

    #[tokio::test]
    async fn leaving_map_tears_down_subscriptions() {
        let (engine, light_sensor) = engine();

        assert_eq!(engine.navigate(Navigation::OpenMap).await.unwrap(), Screen::Map);
        tokio::time::sleep(Duration::from_millis(50)).await;

        let snapshot = engine.map_snapshot().await.unwrap();
        assert_eq!(snapshot.current_location, Coordinates::new(4.6, -74.1));
        assert_eq!(snapshot.ambient_light, 50.0);
        assert_eq!(light_sensor.listener_count(), 1);

        engine.navigate(Navigation::Back).await.unwrap();
        tokio::time::sleep(Duration::from_millis(20)).await;

        assert_eq!(light_sensor.listener_count(), 0);
        assert_eq!(engine.map_snapshot().await.unwrap_err().code, 100);
    }

    #[tokio::test]
    async fn rejects_invalid_transition() {
        let (engine, _) = engine();

        assert_eq!(engine.navigate(Navigation::Back).await.unwrap_err().code, 100);
        assert_eq!(engine.current_screen().await, Screen::Menu);
    }

    #[tokio::test]
    async fn rejects_out_of_range_coordinates() {
        let (engine, _) = engine();
        engine.navigate(Navigation::OpenMap).await.unwrap();

        let err = engine
            .long_press(Coordinates::new(91.0, 0.0))
            .await
            .unwrap_err();
        assert_eq!(err.code, 101);

        let err = engine.search("   ".into()).await.unwrap_err();
        assert_eq!(err.code, 101);
    }
}
