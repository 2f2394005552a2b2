//! Observer registries and fire-and-forget dispatch.
//!
//! Decoded messages fan out to application code through four independent
//! observer categories: generic commands, camera samples, game-event
//! occurrences, and level-init map names.
//!
//! Dispatch is fire-and-forget: each observer invocation runs in its own
//! Tokio task, so the connection's frame-reading loop never waits on
//! application code, observers never wait on each other, and a panicking
//! observer takes down only its own task. No ordering is guaranteed
//! across observers or across dispatched messages, and there is no
//! cancellation — an observer that never returns simply never completes.

use std::sync::{Arc, RwLock};

use camlink_protocol::{CamSample, FrameTag, GameEventOccurrence};

type Observer<T> = Arc<dyn Fn(T) + Send + Sync>;

/// Per-category observer registries.
///
/// Registration and dispatch may happen concurrently from different
/// tasks; each registry is behind its own `RwLock`, taken briefly to
/// snapshot the observer list before spawning.
#[derive(Default)]
pub struct Dispatcher {
    command: RwLock<Vec<Observer<FrameTag>>>,
    cam: RwLock<Vec<Observer<CamSample>>>,
    event: RwLock<Vec<Observer<Arc<GameEventOccurrence>>>>,
    level_init: RwLock<Vec<Observer<Arc<str>>>>,
}

impl Dispatcher {
    /// Creates a dispatcher with no observers registered.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an observer for generic commands — every recognized
    /// control tag plus any unknown tag.
    pub fn on_command(
        &self,
        observer: impl Fn(FrameTag) + Send + Sync + 'static,
    ) {
        let mut observers =
            self.command.write().expect("command registry poisoned");
        observers.push(Arc::new(observer));
        tracing::debug!(
            active_observers = observers.len(),
            "registered command observer"
        );
    }

    /// Registers an observer for camera samples.
    pub fn on_cam(
        &self,
        observer: impl Fn(CamSample) + Send + Sync + 'static,
    ) {
        let mut observers =
            self.cam.write().expect("cam registry poisoned");
        observers.push(Arc::new(observer));
        tracing::debug!(
            active_observers = observers.len(),
            "registered camera observer"
        );
    }

    /// Registers an observer for decoded game-event occurrences.
    pub fn on_event(
        &self,
        observer: impl Fn(Arc<GameEventOccurrence>) + Send + Sync + 'static,
    ) {
        let mut observers =
            self.event.write().expect("event registry poisoned");
        observers.push(Arc::new(observer));
        tracing::debug!(
            active_observers = observers.len(),
            "registered event observer"
        );
    }

    /// Registers an observer for level-init map names.
    pub fn on_level_init(
        &self,
        observer: impl Fn(Arc<str>) + Send + Sync + 'static,
    ) {
        let mut observers = self
            .level_init
            .write()
            .expect("level-init registry poisoned");
        observers.push(Arc::new(observer));
        tracing::debug!(
            active_observers = observers.len(),
            "registered level-init observer"
        );
    }

    /// Fans a generic command out to its observers.
    pub fn dispatch_command(&self, tag: FrameTag) {
        let observers =
            self.command.read().expect("command registry poisoned").clone();
        for observer in observers {
            let tag = tag.clone();
            tokio::spawn(async move { observer(tag) });
        }
    }

    /// Fans a camera sample out to its observers.
    pub fn dispatch_cam(&self, sample: CamSample) {
        let observers =
            self.cam.read().expect("cam registry poisoned").clone();
        for observer in observers {
            tokio::spawn(async move { observer(sample) });
        }
    }

    /// Fans a game-event occurrence out to its observers.
    pub fn dispatch_event(&self, occurrence: GameEventOccurrence) {
        let occurrence = Arc::new(occurrence);
        let observers =
            self.event.read().expect("event registry poisoned").clone();
        for observer in observers {
            let occurrence = Arc::clone(&occurrence);
            tokio::spawn(async move { observer(occurrence) });
        }
    }

    /// Fans a level-init map name out to its observers.
    pub fn dispatch_level_init(&self, map_name: &str) {
        let map_name: Arc<str> = Arc::from(map_name);
        let observers = self
            .level_init
            .read()
            .expect("level-init registry poisoned")
            .clone();
        for observer in observers {
            let map_name = Arc::clone(&map_name);
            tokio::spawn(async move { observer(map_name) });
        }
    }
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::{Duration, Instant};

    use super::*;

    /// Polls until `counter` reaches `expected` or a second passes.
    async fn wait_for_count(counter: &Arc<AtomicUsize>, expected: usize) {
        let deadline = Instant::now() + Duration::from_secs(1);
        while counter.load(Ordering::SeqCst) < expected {
            assert!(
                Instant::now() < deadline,
                "observers did not run within 1s (saw {})",
                counter.load(Ordering::SeqCst)
            );
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_dispatch_command_reaches_every_observer() {
        let dispatcher = Dispatcher::new();
        let counter = Arc::new(AtomicUsize::new(0));

        for _ in 0..3 {
            let counter = Arc::clone(&counter);
            dispatcher.on_command(move |tag| {
                assert_eq!(tag, FrameTag::DataStart);
                counter.fetch_add(1, Ordering::SeqCst);
            });
        }

        dispatcher.dispatch_command(FrameTag::DataStart);
        wait_for_count(&counter, 3).await;
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_dispatch_event_shares_one_occurrence() {
        let dispatcher = Dispatcher::new();
        let counter = Arc::new(AtomicUsize::new(0));

        for _ in 0..2 {
            let counter = Arc::clone(&counter);
            dispatcher.on_event(move |occurrence| {
                assert_eq!(occurrence.name, "round_end");
                counter.fetch_add(1, Ordering::SeqCst);
            });
        }

        dispatcher.dispatch_event(GameEventOccurrence {
            name: "round_end".into(),
            client_time: 1.0,
            keys: Default::default(),
        });
        wait_for_count(&counter, 2).await;
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_dispatch_panicking_observer_does_not_suppress_others() {
        let dispatcher = Dispatcher::new();
        let counter = Arc::new(AtomicUsize::new(0));

        dispatcher.on_cam(|_| panic!("observer fault"));
        for _ in 0..2 {
            let counter = Arc::clone(&counter);
            dispatcher.on_cam(move |_| {
                counter.fetch_add(1, Ordering::SeqCst);
            });
        }

        dispatcher.dispatch_cam(CamSample::default());
        wait_for_count(&counter, 2).await;

        // The dispatcher stays usable after the fault.
        dispatcher.dispatch_cam(CamSample::default());
        wait_for_count(&counter, 4).await;
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_dispatch_does_not_block_the_caller() {
        let dispatcher = Dispatcher::new();
        let (tx, rx) = std::sync::mpsc::channel::<()>();

        // This observer blocks until released.
        let rx = std::sync::Mutex::new(rx);
        dispatcher.on_level_init(move |_| {
            rx.lock().unwrap().recv().ok();
        });

        let start = Instant::now();
        dispatcher.dispatch_level_init("de_nuke");
        assert!(
            start.elapsed() < Duration::from_millis(100),
            "dispatch must return without waiting on observers"
        );

        tx.send(()).unwrap();
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_dispatch_with_no_observers_is_a_no_op() {
        let dispatcher = Dispatcher::new();
        dispatcher.dispatch_command(FrameTag::Hello);
        dispatcher.dispatch_cam(CamSample::default());
        dispatcher.dispatch_level_init("de_dust2");
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_register_after_dispatch_applies_to_later_messages() {
        let dispatcher = Dispatcher::new();
        let counter = Arc::new(AtomicUsize::new(0));

        dispatcher.dispatch_command(FrameTag::Hello);

        let observer_counter = Arc::clone(&counter);
        dispatcher.on_command(move |_| {
            observer_counter.fetch_add(1, Ordering::SeqCst);
        });

        dispatcher.dispatch_command(FrameTag::Hello);
        wait_for_count(&counter, 1).await;
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }
}
