use axum::extract::{Extension, Json};
use axum::http::StatusCode;
use serde::{Deserialize, Serialize};

use crate::api::{DynAPI, SearchOutcome};
use crate::entities::{Coordinates, MapSnapshot, Marker};
use crate::error::Error;

#[derive(Serialize, Deserialize)]
pub struct TrackingParams {
    enabled: bool,
}

#[derive(Serialize, Deserialize)]
pub struct SearchParams {
    query: String,
}

#[derive(Serialize, Deserialize)]
pub struct RouteParams {
    origin: Option<Coordinates>,
    destination: Coordinates,
}

pub async fn snapshot(Extension(api): Extension<DynAPI>) -> Result<Json<MapSnapshot>, Error> {
    let snapshot = api.map_snapshot().await?;

    Ok(snapshot.into())
}

pub async fn set_tracking(
    Extension(api): Extension<DynAPI>,
    Json(params): Json<TrackingParams>,
) -> Result<Json<MapSnapshot>, Error> {
    let snapshot = api.set_tracking(params.enabled).await?;

    Ok(snapshot.into())
}

pub async fn search(
    Extension(api): Extension<DynAPI>,
    Json(params): Json<SearchParams>,
) -> Result<Json<SearchOutcome>, Error> {
    let outcome = api.search(params.query).await?;

    Ok(outcome.into())
}

pub async fn long_press(
    Extension(api): Extension<DynAPI>,
    Json(position): Json<Coordinates>,
) -> Result<Json<Marker>, Error> {
    let marker = api.long_press(position).await?;

    Ok(marker.into())
}

pub async fn request_route(
    Extension(api): Extension<DynAPI>,
    Json(params): Json<RouteParams>,
) -> Result<StatusCode, Error> {
    api.request_route(params.origin, params.destination).await?;

    Ok(StatusCode::ACCEPTED)
}
