use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::{
    config::Config,
    entities::{Coordinates, Route},
    error::{invalid_input_error, upstream_error, Error},
    external::{Directions, Geocoder},
    polyline,
};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Place {
    pub formatted_address: String,
    pub geometry: Geometry,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Geometry {
    pub location: Coordinates,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
struct Response<T> {
    status: Option<String>,
    #[serde(default = "Vec::new")]
    results: Vec<T>,
    #[serde(default = "Vec::new")]
    routes: Vec<T>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
struct DirectionsRoute {
    overview_polyline: OverviewPolyline,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
struct OverviewPolyline {
    points: String,
}

impl<T> Response<T> {
    fn is_ok(&self) -> bool {
        match self.status.as_deref() {
            None | Some("OK") | Some("ZERO_RESULTS") => true,
            Some(status) => {
                tracing::warn!("google maps returned status {}", status);
                false
            }
        }
    }
}

/// Parses a directions response body into the first route. An empty
/// `routes` array is an empty route; an unparseable body is an error.
pub fn parse_directions(body: &str) -> Result<Route, Error> {
    let data: Response<DirectionsRoute> = serde_json::from_str(body)?;

    if !data.is_ok() {
        return Err(upstream_error());
    }

    match data.routes.first() {
        Some(route) => polyline::decode(&route.overview_polyline.points),
        None => Ok(Route::default()),
    }
}

#[derive(Clone, Debug)]
pub struct GoogleMaps {
    client: reqwest::Client,
    api_base: String,
    api_key: String,
}

impl GoogleMaps {
    pub fn new(config: &Config) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_base: config.api_base.clone(),
            api_key: config.api_key.clone(),
        }
    }

    async fn get(&self, path: &str, query: &[(&str, String)]) -> Result<String, Error> {
        let url = format!("{}/maps/api/{}", self.api_base, path);

        let res = self
            .client
            .get(url)
            .query(query)
            .query(&[("key", &self.api_key)])
            .send()
            .await?;

        let status_code = res.status().as_u16();

        if status_code >= 400 && status_code < 500 {
            return Err(invalid_input_error());
        } else if status_code != 200 {
            return Err(upstream_error());
        }

        Ok(res.text().await?)
    }

    async fn find_places(&self, query: &[(&str, String)]) -> Result<Vec<Place>, Error> {
        let body = self.get("geocode/json", query).await?;
        let data: Response<Place> = serde_json::from_str(&body)?;

        if !data.is_ok() {
            return Err(upstream_error());
        }

        Ok(data.results)
    }
}

#[async_trait]
impl Directions for GoogleMaps {
    #[tracing::instrument(skip(self))]
    async fn fetch_route(&self, origin: Coordinates, destination: Coordinates) -> Result<Route, Error> {
        let origin: String = origin.into();
        let destination: String = destination.into();

        let body = self
            .get(
                "directions/json",
                &[("origin", origin), ("destination", destination)],
            )
            .await?;

        let route = parse_directions(&body)?;
        tracing::info!("fetched route with {} points", route.len());

        Ok(route)
    }
}

#[async_trait]
impl Geocoder for GoogleMaps {
    #[tracing::instrument(skip(self))]
    async fn geocode(&self, query: &str) -> Result<Option<Coordinates>, Error> {
        let places = self.find_places(&[("address", query.to_string())]).await?;

        Ok(places.first().map(|place| place.geometry.location))
    }

    #[tracing::instrument(skip(self))]
    async fn reverse_geocode(&self, coordinates: Coordinates) -> Result<Option<String>, Error> {
        let latlng: String = coordinates.into();
        let places = self.find_places(&[("latlng", latlng)]).await?;

        Ok(places.into_iter().next().map(|place| place.formatted_address))
    }
}

#[test]
fn parses_first_route() {
    let body = r#"{
        "status": "OK",
        "routes": [
            { "overview_polyline": { "points": "_p~iF~ps|U_ulLnnqC_mqNvxq`@" } },
            { "overview_polyline": { "points": "_p~iF~ps|U" } }
        ]
    }"#;

    let route = parse_directions(body).unwrap();

    assert_eq!(route.len(), 3);
    assert!(route.points[2].approx_eq(&Coordinates::new(43.252, -126.453), 1e-5));
}

#[test]
fn empty_routes_is_empty_route() {
    assert!(parse_directions(r#"{"status": "ZERO_RESULTS", "routes": []}"#)
        .unwrap()
        .is_empty());
    assert!(parse_directions(r#"{"routes": []}"#).unwrap().is_empty());
    assert!(parse_directions(r#"{}"#).unwrap().is_empty());
}

#[test]
fn unparseable_body_is_upstream_error() {
    assert_eq!(parse_directions("").unwrap_err().code, 4);
    assert_eq!(parse_directions("<html>").unwrap_err().code, 4);
}

#[test]
fn denied_request_is_upstream_error() {
    let body = r#"{"status": "REQUEST_DENIED", "routes": []}"#;
    assert_eq!(parse_directions(body).unwrap_err().code, 4);
}

#[test]
fn malformed_points_surface_decode_error() {
    let body = r#"{"routes": [{ "overview_polyline": { "points": "_p~iF" } }]}"#;
    assert_eq!(parse_directions(body).unwrap_err().code, 102);
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{extract::Query, routing::get, Json, Router};
    use serde_json::{json, Value};
    use std::collections::HashMap;
    use std::net::SocketAddr;

    async fn directions(Query(params): Query<HashMap<String, String>>) -> Json<Value> {
        if params.get("key").map(String::as_str) != Some("test-key") {
            return Json(json!({ "status": "REQUEST_DENIED", "routes": [] }));
        }

        if params.get("destination").map(String::as_str) == Some("0,0") {
            return Json(json!({ "status": "ZERO_RESULTS", "routes": [] }));
        }

        assert_eq!(params.get("origin").unwrap(), "38.5,-120.2");

        Json(json!({
            "status": "OK",
            "routes": [{ "overview_polyline": { "points": "_p~iF~ps|U_ulLnnqC_mqNvxq`@" } }]
        }))
    }

    async fn geocode(Query(params): Query<HashMap<String, String>>) -> Json<Value> {
        let found = json!({
            "status": "OK",
            "results": [{
                "formatted_address": "Cra. 7 #6-50, Bogotá",
                "geometry": { "location": { "lat": 4.59796, "lng": -74.07605 } }
            }]
        });

        match (params.get("address"), params.get("latlng")) {
            (Some(address), _) if address == "Plaza de Bolívar" => Json(found),
            (_, Some(latlng)) if latlng == "4.59796,-74.07605" => Json(found),
            _ => Json(json!({ "status": "ZERO_RESULTS", "results": [] })),
        }
    }

    fn spawn_upstream() -> GoogleMaps {
        let app = Router::new()
            .route("/maps/api/directions/json", get(directions))
            .route("/maps/api/geocode/json", get(geocode))
            .route("/broken/maps/api/directions/json", get(|| async { "<html>" }));

        let server = axum::Server::bind(&SocketAddr::from(([127, 0, 0, 1], 0)))
            .serve(app.into_make_service());
        let addr = server.local_addr();
        tokio::spawn(server);

        GoogleMaps {
            client: reqwest::Client::new(),
            api_base: format!("http://{}", addr),
            api_key: "test-key".into(),
        }
    }

    #[tokio::test]
    async fn fetches_and_decodes_route() {
        let maps = spawn_upstream();

        let route = maps
            .fetch_route(Coordinates::new(38.5, -120.2), Coordinates::new(43.252, -126.453))
            .await
            .unwrap();

        assert_eq!(route.len(), 3);
        assert!(route.points[1].approx_eq(&Coordinates::new(40.7, -120.95), 1e-5));
    }

    #[tokio::test]
    async fn no_route_is_empty_not_error() {
        let maps = spawn_upstream();

        let route = maps
            .fetch_route(Coordinates::new(38.5, -120.2), Coordinates::new(0.0, 0.0))
            .await
            .unwrap();

        assert!(route.is_empty());
    }

    #[tokio::test]
    async fn bad_credential_is_upstream_error() {
        let mut maps = spawn_upstream();
        maps.api_key = "wrong".into();

        let err = maps
            .fetch_route(Coordinates::new(38.5, -120.2), Coordinates::new(43.252, -126.453))
            .await
            .unwrap_err();

        assert_eq!(err.code, 4);
    }

    #[tokio::test]
    async fn html_body_is_upstream_error() {
        let mut maps = spawn_upstream();
        maps.api_base = format!("{}/broken", maps.api_base);

        let err = maps
            .fetch_route(Coordinates::new(38.5, -120.2), Coordinates::new(43.252, -126.453))
            .await
            .unwrap_err();

        assert_eq!(err.code, 4);
    }

    #[tokio::test]
    async fn unknown_path_is_invalid_input() {
        let mut maps = spawn_upstream();
        maps.api_base = format!("{}/missing", maps.api_base);

        let err = maps.geocode("anything").await.unwrap_err();

        assert_eq!(err.code, 101);
    }

    #[tokio::test]
    async fn geocodes_both_directions() {
        let maps = spawn_upstream();

        let found = maps.geocode("Plaza de Bolívar").await.unwrap();
        assert_eq!(found, Some(Coordinates::new(4.59796, -74.07605)));

        let address = maps
            .reverse_geocode(Coordinates::new(4.59796, -74.07605))
            .await
            .unwrap();
        assert_eq!(address.as_deref(), Some("Cra. 7 #6-50, Bogotá"));

        assert_eq!(maps.geocode("nowhere").await.unwrap(), None);
        assert_eq!(
            maps.reverse_geocode(Coordinates::new(0.0, 0.0)).await.unwrap(),
            None
        );
    }
}
