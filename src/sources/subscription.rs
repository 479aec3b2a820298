use async_channel::{Receiver, Sender};
use futures::Stream;
use std::pin::Pin;
use std::task::{Context, Poll};

/// Readings buffered per subscription before `Sink::send` starts dropping.
pub const SUBSCRIPTION_BUFFER: usize = 64;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ListenerId(pub u64);

/// Handle given to a platform callback for delivering readings.
#[derive(Clone, Debug)]
pub struct Sink<T> {
    tx: Sender<T>,
}

impl<T> Sink<T> {
    /// Delivers a reading without blocking the callback. Returns false once
    /// the subscriber has gone away; readings are dropped while the buffer
    /// is full.
    pub fn send(&self, value: T) -> bool {
        match self.tx.try_send(value) {
            Ok(()) => true,
            Err(err) if err.is_full() => {
                tracing::trace!("subscription buffer full, dropping reading");
                true
            }
            Err(_) => false,
        }
    }

    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

struct Registration {
    id: ListenerId,
    unregister: Option<Box<dyn FnOnce(ListenerId) + Send>>,
}

impl Drop for Registration {
    fn drop(&mut self) {
        if let Some(unregister) = self.unregister.take() {
            tracing::debug!("unregistering listener {:?}", self.id);
            unregister(self.id);
        }
    }
}

/// A live sequence of readings from a callback-based source.
///
/// The listener stays registered for as long as the subscription is alive.
/// Dropping it, or calling [`Subscription::cancel`], unregisters the
/// listener exactly once and closes the channel so late callbacks see
/// `Sink::send` return false.
pub struct Subscription<T> {
    rx: Pin<Box<Receiver<T>>>,
    registration: Option<Registration>,
}

impl<T> Subscription<T> {
    /// A subscription that has already terminated, with no listener attached.
    pub fn empty() -> Self {
        let (_, rx) = async_channel::bounded(1);

        Self {
            rx: Box::pin(rx),
            registration: None,
        }
    }

    pub fn is_registered(&self) -> bool {
        self.registration.is_some()
    }

    pub fn cancel(self) {}
}

impl<T> Drop for Subscription<T> {
    fn drop(&mut self) {
        self.rx.close();
        self.registration.take();
    }
}

impl<T> Stream for Subscription<T> {
    type Item = T;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<T>> {
        self.rx.as_mut().poll_next(cx)
    }
}

/// Attaches a listener through `register` and returns the subscription that
/// will detach it through `unregister`.
pub fn subscribe<T, R, U>(register: R, unregister: U) -> Subscription<T>
where
    R: FnOnce(Sink<T>) -> ListenerId,
    U: FnOnce(ListenerId) + Send + 'static,
{
    let (tx, rx) = async_channel::bounded(SUBSCRIPTION_BUFFER);
    let id = register(Sink { tx });

    Subscription {
        rx: Box::pin(rx),
        registration: Some(Registration {
            id,
            unregister: Some(Box::new(unregister)),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;
    use std::sync::{Arc, Mutex};

    #[derive(Default)]
    struct FakeSource {
        sinks: Mutex<Vec<Sink<u32>>>,
        unregistered: Mutex<Vec<ListenerId>>,
    }

    fn subscribe_to(source: &Arc<FakeSource>) -> Subscription<u32> {
        let unregister_source = source.clone();

        subscribe(
            |sink| {
                let mut sinks = source.sinks.lock().unwrap();
                sinks.push(sink);
                ListenerId(sinks.len() as u64)
            },
            move |id| unregister_source.unregistered.lock().unwrap().push(id),
        )
    }

    #[test]
    fn delivers_readings_in_order() {
        let source = Arc::new(FakeSource::default());
        let mut subscription = subscribe_to(&source);

        let sink = source.sinks.lock().unwrap()[0].clone();
        assert!(sink.send(1));
        assert!(sink.send(2));

        tokio_test::block_on(async {
            assert_eq!(subscription.next().await, Some(1));
            assert_eq!(subscription.next().await, Some(2));
        });
    }

    #[test]
    fn cancel_unregisters_exactly_once() {
        let source = Arc::new(FakeSource::default());
        let subscription = subscribe_to(&source);
        let sink = source.sinks.lock().unwrap()[0].clone();

        assert!(subscription.is_registered());
        subscription.cancel();

        assert_eq!(*source.unregistered.lock().unwrap(), vec![ListenerId(1)]);
        assert!(sink.is_closed());
        assert!(!sink.send(3));
        assert_eq!(source.unregistered.lock().unwrap().len(), 1);
    }

    #[test]
    fn each_subscription_owns_its_listener() {
        let source = Arc::new(FakeSource::default());
        let first = subscribe_to(&source);
        let second = subscribe_to(&source);

        drop(second);
        assert_eq!(*source.unregistered.lock().unwrap(), vec![ListenerId(2)]);

        drop(first);
        assert_eq!(
            *source.unregistered.lock().unwrap(),
            vec![ListenerId(2), ListenerId(1)]
        );
    }

    #[test]
    fn full_buffer_drops_readings() {
        let source = Arc::new(FakeSource::default());
        let subscription = subscribe_to(&source);
        let sink = source.sinks.lock().unwrap().remove(0);

        for reading in 0..(SUBSCRIPTION_BUFFER as u32 + 10) {
            assert!(sink.send(reading));
        }

        // closing the last sink ends the stream once the buffer is drained
        drop(sink);
        let received: Vec<u32> = tokio_test::block_on(subscription.collect());

        assert_eq!(received, (0..SUBSCRIPTION_BUFFER as u32).collect::<Vec<_>>());
    }

    #[test]
    fn empty_subscription_ends_immediately() {
        let mut subscription = Subscription::<u32>::empty();

        assert!(!subscription.is_registered());
        assert_eq!(tokio_test::block_on(subscription.next()), None);
    }
}
