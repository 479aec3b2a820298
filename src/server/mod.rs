mod handlers;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    extract::Extension,
    routing::{get, patch, post},
    Router,
};

use crate::api::{DynAPI, API};
use crate::error::Error;
use crate::server::handlers::{map, navigation};

pub fn router(api: DynAPI) -> Router {
    Router::new()
        .route("/screen", get(navigation::current))
        .route("/screen/navigate", post(navigation::navigate))
        .route("/map", get(map::snapshot))
        .route("/map/tracking", patch(map::set_tracking))
        .route("/map/search", post(map::search))
        .route("/map/markers", post(map::long_press))
        .route("/map/route", post(map::request_route))
        .layer(Extension(api))
}

pub async fn serve<T: API + Sync + Send + 'static>(api: T, addr: SocketAddr) -> Result<(), Error> {
    let app = router(Arc::new(api) as DynAPI);

    tracing::info!("listening on {}", addr);

    axum::Server::try_bind(&addr)
        .map_err(|err| {
            tracing::error!("failed to bind {}: {}", addr, err);
            crate::error::config_error("MAPTRACK_LISTEN_ADDR")
        })?
        .serve(app.into_make_service())
        .await
        .map_err(|err| {
            tracing::error!("server error: {}", err);
            crate::error::upstream_error()
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::{json, Value};
    use std::time::Duration;

    use crate::{
        engine::Engine,
        entities::{Coordinates, Route},
        external::{Directions, Geocoder},
        sources::{SimulatedLightSensor, SimulatedSources},
    };

    struct Fixed;

    #[async_trait]
    impl Geocoder for Fixed {
        async fn geocode(&self, _: &str) -> Result<Option<Coordinates>, Error> {
            Ok(Some(Coordinates::new(4.59796, -74.07605)))
        }

        async fn reverse_geocode(&self, _: Coordinates) -> Result<Option<String>, Error> {
            Err(crate::error::upstream_error())
        }
    }

    #[async_trait]
    impl Directions for Fixed {
        async fn fetch_route(&self, origin: Coordinates, destination: Coordinates) -> Result<Route, Error> {
            Ok(Route::new(vec![origin, destination]))
        }
    }

    fn spawn_app() -> String {
        let light_sensor =
            Arc::new(SimulatedLightSensor::new(2.0, 0.0, Duration::from_millis(10)).unwrap());
        let sources = Arc::new(SimulatedSources {
            position: Coordinates::new(4.6, -74.1),
            interval: Duration::from_millis(10),
            light_sensor,
        });
        let engine = Engine::new(Arc::new(Fixed), Arc::new(Fixed), sources);

        let server = axum::Server::bind(&SocketAddr::from(([127, 0, 0, 1], 0)))
            .serve(router(Arc::new(engine) as DynAPI).into_make_service());
        let addr = server.local_addr();
        tokio::spawn(server);

        format!("http://{}", addr)
    }

    #[tokio::test]
    async fn map_flow_over_http() {
        let base = spawn_app();
        let client = reqwest::Client::new();

        let res = client.get(format!("{}/map", base)).send().await.unwrap();
        assert_eq!(res.status(), 400);

        let screen: Value = client
            .post(format!("{}/screen/navigate", base))
            .json(&json!({ "action": "open_map" }))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(screen["screen"], "map");

        tokio::time::sleep(Duration::from_millis(50)).await;

        let marker: Value = client
            .post(format!("{}/map/markers", base))
            .json(&json!({ "lat": 4.65, "lng": -74.05 }))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(marker["title"], "address not found");

        let res = client
            .post(format!("{}/map/route", base))
            .json(&json!({ "destination": { "lat": 4.7, "lng": -74.0 } }))
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), 202);

        tokio::time::sleep(Duration::from_millis(20)).await;

        let snapshot: Value = client
            .get(format!("{}/map", base))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(snapshot["style"], "dark");
        assert_eq!(snapshot["directions"]["name"], "ready");
        assert_eq!(snapshot["directions"]["route"]["points"][1]["lat"], 4.7);
        assert!(snapshot["encoded_directions"].is_string());
        assert_eq!(snapshot["markers"][0]["title"], "You are here");
    }
}
