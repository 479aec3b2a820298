use super::Engine;

use async_trait::async_trait;

use crate::{
    api::{MapAPI, SearchOutcome},
    entities::{Coordinates, MapSnapshot, Marker},
    error::{invalid_input_error, Error},
};

#[async_trait]
impl MapAPI for Engine {
    async fn map_snapshot(&self) -> Result<MapSnapshot, Error> {
        Ok(self.map().await?.snapshot().await)
    }

    #[tracing::instrument(skip(self))]
    async fn set_tracking(&self, enabled: bool) -> Result<MapSnapshot, Error> {
        Ok(self.map().await?.set_tracking(enabled).await)
    }

    #[tracing::instrument(skip(self))]
    async fn search(&self, query: String) -> Result<SearchOutcome, Error> {
        let query = query.trim();
        if query.is_empty() {
            return Err(invalid_input_error());
        }

        Ok(self.map().await?.search(query).await)
    }

    #[tracing::instrument(skip(self))]
    async fn long_press(&self, position: Coordinates) -> Result<Marker, Error> {
        validate(&position)?;

        Ok(self.map().await?.long_press(position).await)
    }

    #[tracing::instrument(skip(self))]
    async fn request_route(
        &self,
        origin: Option<Coordinates>,
        destination: Coordinates,
    ) -> Result<(), Error> {
        if let Some(origin) = &origin {
            validate(origin)?;
        }
        validate(&destination)?;

        self.map().await?.request_route(origin, destination).await;

        Ok(())
    }
}

fn validate(coordinates: &Coordinates) -> Result<(), Error> {
    if !(-90.0..=90.0).contains(&coordinates.lat) || !(-180.0..=180.0).contains(&coordinates.lng) {
        return Err(invalid_input_error());
    }

    Ok(())
}
