mod light;
mod location;
mod subscription;

pub use light::{ambient_light, LightSensor, SimulatedLightSensor};
pub use location::{
    location_updates, simulated_fixes, LocationProvider, LOCATION_UPDATE_INTERVAL,
    SIMULATED_FIX_INTERVAL,
};
pub use subscription::{subscribe, ListenerId, Sink, Subscription, SUBSCRIPTION_BUFFER};

use futures::stream::{BoxStream, StreamExt};
use std::sync::Arc;
use std::time::Duration;

use crate::entities::{Coordinates, Fix, Lux};

/// Creates the event streams a map session consumes. Each call subscribes
/// anew; dropping a returned stream tears its listener down.
pub trait SourceFactory: Send + Sync {
    fn fixes(&self) -> BoxStream<'static, Fix>;
    fn ambient_light(&self) -> BoxStream<'static, Lux>;
}

pub struct SimulatedSources {
    pub position: Coordinates,
    pub interval: Duration,
    pub light_sensor: Arc<SimulatedLightSensor>,
}

impl SourceFactory for SimulatedSources {
    fn fixes(&self) -> BoxStream<'static, Fix> {
        simulated_fixes(self.position, self.interval).boxed()
    }

    fn ambient_light(&self) -> BoxStream<'static, Lux> {
        ambient_light(self.light_sensor.clone()).boxed()
    }
}

pub struct DeviceSources {
    pub location: Arc<dyn LocationProvider>,
    pub light_sensor: Arc<dyn LightSensor>,
    pub interval: Duration,
}

impl DeviceSources {
    pub fn new(location: Arc<dyn LocationProvider>, light_sensor: Arc<dyn LightSensor>) -> Self {
        Self {
            location,
            light_sensor,
            interval: LOCATION_UPDATE_INTERVAL,
        }
    }
}

impl SourceFactory for DeviceSources {
    fn fixes(&self) -> BoxStream<'static, Fix> {
        location_updates(self.location.clone(), self.interval).boxed()
    }

    fn ambient_light(&self) -> BoxStream<'static, Lux> {
        ambient_light(self.light_sensor.clone()).boxed()
    }
}
