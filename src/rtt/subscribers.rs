//local shortcuts
use crate::callback_pump::CallbackPump;

//third-party shortcuts

//standard shortcuts
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

//-------------------------------------------------------------------------------------------------------------------

/// A registered RTT event callback. `Arc<dyn Fn>` rather than `FnOnce` since a subscriber may be invoked repeatedly
/// for as long as it stays registered.
pub type SubscriberCallback = Arc<dyn Fn(String) + Send + Sync>;

//-------------------------------------------------------------------------------------------------------------------

/// Mapping from RTT service name (`chat`, `messaging`, `lobby`, `relay`, ...) to exactly one event callback.
/// Registering twice for the same service replaces the prior callback. Safe against a running receive loop: a
/// lookup racing a concurrent deregister may or may not see the old callback, but never panics or tears anything
/// down.
#[derive(Default)]
pub(crate) struct Subscribers
{
    callbacks: Mutex<HashMap<String, SubscriberCallback>>,
}

impl Subscribers
{
    pub(crate) fn new() -> Self
    {
        Self::default()
    }

    pub(crate) fn register(&self, service: impl Into<String>, callback: SubscriberCallback)
    {
        self.callbacks.lock().unwrap_or_else(|poison| poison.into_inner()).insert(service.into(), callback);
    }

    pub(crate) fn deregister(&self, service: &str)
    {
        self.callbacks.lock().unwrap_or_else(|poison| poison.into_inner()).remove(service);
    }

    pub(crate) fn deregister_all(&self)
    {
        self.callbacks.lock().unwrap_or_else(|poison| poison.into_inner()).clear();
    }

    /// Looks up the subscriber for `service` and, if present, enqueues it on `pump` with `payload`. A subscriber
    /// fires on the caller's thread from inside `runCallbacks`, never from the receive loop itself.
    pub(crate) fn dispatch(&self, pump: &CallbackPump, service: &str, payload: String) -> bool
    {
        let callback = self.callbacks.lock().unwrap_or_else(|poison| poison.into_inner()).get(service).cloned();
        let Some(callback) = callback else { return false; };
        pump.enqueue(Some(Box::new(move |payload| callback(payload))), payload);
        true
    }
}

//-------------------------------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests
{
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    #[test]
    fn registering_twice_replaces_the_callback()
    {
        let subscribers = Subscribers::new();
        let pump = CallbackPump::new();
        let first_hits = Arc::new(AtomicUsize::new(0));
        let second_hits = Arc::new(AtomicUsize::new(0));

        let first = Arc::clone(&first_hits);
        subscribers.register("chat", Arc::new(move |_| { first.fetch_add(1, Ordering::SeqCst); }));
        let second = Arc::clone(&second_hits);
        subscribers.register("chat", Arc::new(move |_| { second.fetch_add(1, Ordering::SeqCst); }));

        assert!(subscribers.dispatch(&pump, "chat", "{}".to_string()));
        pump.drain(Duration::from_millis(10));

        assert_eq!(first_hits.load(Ordering::SeqCst), 0);
        assert_eq!(second_hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn dispatch_to_unregistered_service_returns_false()
    {
        let subscribers = Subscribers::new();
        let pump = CallbackPump::new();
        assert!(!subscribers.dispatch(&pump, "lobby", "{}".to_string()));
    }

    #[test]
    fn deregister_all_clears_every_subscriber()
    {
        let subscribers = Subscribers::new();
        subscribers.register("chat", Arc::new(|_| {}));
        subscribers.register("lobby", Arc::new(|_| {}));
        subscribers.deregister_all();

        let pump = CallbackPump::new();
        assert!(!subscribers.dispatch(&pump, "chat", "{}".to_string()));
        assert!(!subscribers.dispatch(&pump, "lobby", "{}".to_string()));
    }
}

//-------------------------------------------------------------------------------------------------------------------
