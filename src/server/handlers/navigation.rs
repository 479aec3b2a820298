use axum::extract::{Extension, Json};
use serde::{Deserialize, Serialize};

use crate::api::DynAPI;
use crate::entities::{Navigation, Screen};
use crate::error::Error;

#[derive(Serialize, Deserialize)]
pub struct ScreenResponse {
    screen: Screen,
}

#[derive(Serialize, Deserialize)]
pub struct NavigateParams {
    action: Navigation,
}

pub async fn current(Extension(api): Extension<DynAPI>) -> Json<ScreenResponse> {
    let screen = api.current_screen().await;

    ScreenResponse { screen }.into()
}

pub async fn navigate(
    Extension(api): Extension<DynAPI>,
    Json(params): Json<NavigateParams>,
) -> Result<Json<ScreenResponse>, Error> {
    let screen = api.navigate(params.action).await?;

    Ok(ScreenResponse { screen }.into())
}
