use rand_distr::{Distribution, Normal};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::task::JoinHandle;

use crate::entities::Lux;
use crate::error::{config_error, Error};
use crate::sources::subscription::{subscribe, ListenerId, Sink, Subscription};

/// A platform ambient light sensor delivering readings through callbacks.
pub trait LightSensor: Send + Sync + 'static {
    fn register_listener(&self, sink: Sink<Lux>) -> ListenerId;
    fn unregister_listener(&self, id: ListenerId);
}

pub fn ambient_light(sensor: Arc<dyn LightSensor>) -> Subscription<Lux> {
    let unregisterer = sensor.clone();

    subscribe(
        |sink| sensor.register_listener(sink),
        move |id| unregisterer.unregister_listener(id),
    )
}

/// Light sensor for hosts without one: every listener gets its own task
/// emitting normally distributed readings, clamped at zero.
pub struct SimulatedLightSensor {
    distribution: Normal<f32>,
    interval: Duration,
    next_id: AtomicU64,
    listeners: Mutex<HashMap<ListenerId, JoinHandle<()>>>,
}

impl SimulatedLightSensor {
    pub fn new(mean: Lux, std_dev: Lux, interval: Duration) -> Result<Self, Error> {
        let distribution =
            Normal::new(mean, std_dev).map_err(|_| config_error("light distribution"))?;

        Ok(Self {
            distribution,
            interval,
            next_id: AtomicU64::new(1),
            listeners: Mutex::new(HashMap::new()),
        })
    }

    pub fn listener_count(&self) -> usize {
        self.listeners
            .lock()
            .map(|listeners| listeners.len())
            .unwrap_or_default()
    }
}

impl LightSensor for SimulatedLightSensor {
    #[tracing::instrument(skip(self, sink))]
    fn register_listener(&self, sink: Sink<Lux>) -> ListenerId {
        let id = ListenerId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let distribution = self.distribution;
        let interval = self.interval;

        let handle = tokio::spawn(async move {
            loop {
                let lux = distribution.sample(&mut rand::thread_rng()).max(0.0);

                if !sink.send(lux) {
                    break;
                }

                tokio::time::sleep(interval).await;
            }
        });

        match self.listeners.lock() {
            Ok(mut listeners) => {
                listeners.insert(id, handle);
            }
            Err(_) => {
                tracing::error!("listener table poisoned, dropping listener {:?}", id);
                handle.abort();
            }
        }

        id
    }

    #[tracing::instrument(skip(self))]
    fn unregister_listener(&self, id: ListenerId) {
        let handle = self
            .listeners
            .lock()
            .ok()
            .and_then(|mut listeners| listeners.remove(&id));

        match handle {
            Some(handle) => handle.abort(),
            None => tracing::warn!("unknown light listener {:?}", id),
        }
    }
}

#[tokio::test]
async fn simulated_sensor_stops_on_cancel() {
    use futures::StreamExt;

    let sensor = Arc::new(SimulatedLightSensor::new(5.0, 0.0, Duration::from_millis(5)).unwrap());
    let mut readings = ambient_light(sensor.clone());

    assert_eq!(readings.next().await, Some(5.0));
    assert_eq!(readings.next().await, Some(5.0));
    assert_eq!(sensor.listener_count(), 1);

    readings.cancel();
    assert_eq!(sensor.listener_count(), 0);
}

#[test]
fn rejects_invalid_distribution() {
    let err = SimulatedLightSensor::new(100.0, -1.0, Duration::from_secs(1))
        .err()
        .unwrap();
    assert_eq!(err.code, 6);
}
