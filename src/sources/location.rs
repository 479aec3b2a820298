use futures::{stream, Stream};
use std::sync::Arc;
use std::time::Duration;

use crate::entities::{Coordinates, Fix};
use crate::sources::subscription::{subscribe, ListenerId, Sink, Subscription};

/// Update interval requested from a real location provider.
pub const LOCATION_UPDATE_INTERVAL: Duration = Duration::from_secs(3);
/// Interval between fixes of the simulated source.
pub const SIMULATED_FIX_INTERVAL: Duration = Duration::from_secs(2);

/// A platform location service delivering periodic fixes through callbacks.
pub trait LocationProvider: Send + Sync + 'static {
    /// Whether the location permission has been granted.
    fn is_authorized(&self) -> bool;
    fn request_updates(&self, interval: Duration, sink: Sink<Fix>) -> ListenerId;
    fn remove_updates(&self, id: ListenerId);
}

/// Subscribes to location fixes at `interval`.
///
/// Without authorization the subscription ends immediately with no fixes.
pub fn location_updates(provider: Arc<dyn LocationProvider>, interval: Duration) -> Subscription<Fix> {
    if !provider.is_authorized() {
        tracing::warn!("location permission not granted, no location updates");
        return Subscription::empty();
    }

    let remover = provider.clone();

    subscribe(
        |sink| provider.request_updates(interval, sink),
        move |id| remover.remove_updates(id),
    )
}

/// A fixed position reported immediately and then every `interval`.
pub fn simulated_fixes(position: Coordinates, interval: Duration) -> impl Stream<Item = Fix> {
    stream::unfold(true, move |first| async move {
        if !first {
            tokio::time::sleep(interval).await;
        }

        Some((Fix::now(position), false))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;
    use std::sync::Mutex;
    use tokio::time::Instant;

    struct FakeProvider {
        authorized: bool,
        requests: Mutex<Vec<(Duration, Sink<Fix>)>>,
        removed: Mutex<Vec<ListenerId>>,
    }

    impl FakeProvider {
        fn new(authorized: bool) -> Arc<Self> {
            Arc::new(Self {
                authorized,
                requests: Mutex::new(vec![]),
                removed: Mutex::new(vec![]),
            })
        }
    }

    impl LocationProvider for FakeProvider {
        fn is_authorized(&self) -> bool {
            self.authorized
        }

        fn request_updates(&self, interval: Duration, sink: Sink<Fix>) -> ListenerId {
            let mut requests = self.requests.lock().unwrap();
            requests.push((interval, sink));
            ListenerId(requests.len() as u64)
        }

        fn remove_updates(&self, id: ListenerId) {
            self.removed.lock().unwrap().push(id);
        }
    }

    #[test]
    fn unauthorized_ends_without_fixes() {
        let provider = FakeProvider::new(false);
        let mut fixes = location_updates(provider.clone(), LOCATION_UPDATE_INTERVAL);

        assert_eq!(tokio_test::block_on(fixes.next()), None);
        drop(fixes);

        assert!(provider.requests.lock().unwrap().is_empty());
        assert!(provider.removed.lock().unwrap().is_empty());
    }

    #[test]
    fn forwards_fixes_until_cancelled() {
        let provider = FakeProvider::new(true);
        let mut fixes = location_updates(provider.clone(), LOCATION_UPDATE_INTERVAL);

        let sink = {
            let requests = provider.requests.lock().unwrap();
            assert_eq!(requests[0].0, LOCATION_UPDATE_INTERVAL);
            requests[0].1.clone()
        };

        let fix = Fix::now(Coordinates::new(4.6, -74.1));
        assert!(sink.send(fix));
        assert_eq!(tokio_test::block_on(fixes.next()), Some(fix));

        fixes.cancel();
        assert_eq!(*provider.removed.lock().unwrap(), vec![ListenerId(1)]);
        assert!(!sink.send(fix));
    }

    #[tokio::test]
    async fn simulated_fixes_repeat_on_interval() {
        let position = Coordinates::new(4.60971, -74.08175);
        let interval = Duration::from_millis(20);
        let started = Instant::now();

        let fixes: Vec<Fix> = simulated_fixes(position, interval).take(3).collect().await;

        assert_eq!(fixes.len(), 3);
        assert!(fixes.iter().all(|fix| fix.coordinates == position));
        assert!(started.elapsed() >= interval * 2);
    }
}
