use futures::StreamExt;
use std::sync::{Arc, Mutex as SyncMutex};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

use crate::{
    api::SearchOutcome,
    entities::{marker::ADDRESS_NOT_FOUND, Coordinates, MapSnapshot, MapState, Marker, RouteStatus},
    external::{Directions, Geocoder},
    sources::SourceFactory,
};

struct Shared {
    state: Mutex<MapState>,
    geocoder: Arc<dyn Geocoder>,
    directions: Arc<dyn Directions>,
    route_task: SyncMutex<Option<RouteTask>>,
}

/// In-flight route fetch tagged with its request generation.
type RouteTask = (u64, JoinHandle<()>);

/// Keeps the task of the newest generation in `slot` and aborts the other.
fn install_route_task(slot: &mut Option<RouteTask>, generation: u64, task: JoinHandle<()>) {
    match slot.take() {
        Some((latest, current)) if latest > generation => {
            task.abort();
            *slot = Some((latest, current));
        }
        Some((_, previous)) => {
            previous.abort();
            *slot = Some((generation, task));
        }
        None => *slot = Some((generation, task)),
    }
}

/// Cheap handle for running map operations without holding the screen lock.
#[derive(Clone)]
pub struct MapHandle(Arc<Shared>);

/// The live map screen. Location and light subscriptions run as tasks
/// owned by the session; dropping it aborts them together with any
/// in-flight route fetch, which unregisters the platform listeners.
pub struct MapSession {
    handle: MapHandle,
    tasks: Vec<JoinHandle<()>>,
}

impl MapSession {
    #[tracing::instrument(name = "MapSession::start", skip_all)]
    pub fn start(
        sources: &dyn SourceFactory,
        geocoder: Arc<dyn Geocoder>,
        directions: Arc<dyn Directions>,
    ) -> Self {
        let handle = MapHandle(Arc::new(Shared {
            state: Mutex::new(MapState::default()),
            geocoder,
            directions,
            route_task: SyncMutex::new(None),
        }));

        let mut fixes = sources.fixes();
        let fix_handle = handle.clone();
        let location_task = tokio::spawn(async move {
            while let Some(fix) = fixes.next().await {
                fix_handle.0.state.lock().await.apply_fix(&fix);
            }

            tracing::info!("location updates ended");
        });

        let mut readings = sources.ambient_light();
        let light_handle = handle.clone();
        let light_task = tokio::spawn(async move {
            while let Some(lux) = readings.next().await {
                light_handle.0.state.lock().await.apply_light(lux);
            }

            tracing::info!("ambient light readings ended");
        });

        tracing::info!("map session started");

        Self {
            handle,
            tasks: vec![location_task, light_task],
        }
    }

    pub fn handle(&self) -> MapHandle {
        self.handle.clone()
    }
}

impl Drop for MapSession {
    fn drop(&mut self) {
        for task in self.tasks.drain(..) {
            task.abort();
        }

        if let Ok(mut route_task) = self.handle.0.route_task.lock() {
            if let Some((_, task)) = route_task.take() {
                task.abort();
            }
        }

        tracing::info!("map session torn down");
    }
}

impl MapHandle {
    pub async fn snapshot(&self) -> MapSnapshot {
        self.0.state.lock().await.snapshot()
    }

    #[tracing::instrument(skip(self))]
    pub async fn set_tracking(&self, enabled: bool) -> MapSnapshot {
        let mut state = self.0.state.lock().await;
        state.set_tracking(enabled);

        state.snapshot()
    }

    /// Looks up `query` and centers the map on the best match. Lookup
    /// failures are reported as not found.
    #[tracing::instrument(skip(self))]
    pub async fn search(&self, query: &str) -> SearchOutcome {
        let found = match self.0.geocoder.geocode(query).await {
            Ok(found) => found,
            Err(err) => {
                tracing::warn!("geocoding failed: {}", err);
                None
            }
        };

        match found {
            Some(position) => {
                self.0.state.lock().await.show_search_result(position);
                SearchOutcome::Found { position }
            }
            None => SearchOutcome::NotFound {
                message: ADDRESS_NOT_FOUND.into(),
            },
        }
    }

    #[tracing::instrument(skip(self))]
    pub async fn long_press(&self, position: Coordinates) -> Marker {
        let title = match self.0.geocoder.reverse_geocode(position).await {
            Ok(Some(address)) => address,
            Ok(None) => ADDRESS_NOT_FOUND.into(),
            Err(err) => {
                tracing::warn!("reverse geocoding failed: {}", err);
                ADDRESS_NOT_FOUND.into()
            }
        };

        self.0.state.lock().await.add_marker(position, title)
    }

    /// Starts fetching directions to `destination`. The newest request wins:
    /// a fetch still in flight is aborted and its result, should it race
    /// in, is discarded.
    #[tracing::instrument(skip(self))]
    pub async fn request_route(&self, origin: Option<Coordinates>, destination: Coordinates) {
        let (origin, generation) = {
            let mut state = self.0.state.lock().await;
            let origin = origin.unwrap_or(state.current_location);

            (origin, state.begin_route_request())
        };

        let shared = self.0.clone();
        let task = tokio::spawn(async move {
            let status = match shared.directions.fetch_route(origin, destination).await {
                Ok(route) => {
                    if route.is_empty() {
                        tracing::info!("no route between {:?} and {:?}", origin, destination);
                    }
                    RouteStatus::Ready { route }
                }
                Err(err) => {
                    tracing::warn!("route unavailable: {}", err);
                    RouteStatus::Unavailable
                }
            };

            shared.state.lock().await.finish_route_request(generation, status);
        });

        match self.0.route_task.lock() {
            Ok(mut route_task) => install_route_task(&mut route_task, generation, task),
            Err(_) => tracing::error!("route task slot poisoned"),
        }
    }
}
