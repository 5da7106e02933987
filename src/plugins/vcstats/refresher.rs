//! Bounded, cancellable auto-refresh of dashboard messages.

use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use dashmap::DashMap;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Pause between two renders.
pub const REFRESH_INTERVAL: Duration = Duration::from_secs(10);

/// Renders per auto-refresh session (about five minutes).
pub const MAX_REFRESHES: u32 = 30;

/// Identifies the message a refresh loop edits: (chat id, message id).
pub type RefreshKey = (i64, i32);

struct Running {
    generation: u64,
    token: CancellationToken,
}

/// Owns every running auto-refresh loop.
///
/// A loop ends after `max_ticks` renders, on the first render error, when
/// `stop` is called for its key, when another loop is started for the same
/// key, or when the shutdown token is cancelled.
#[derive(Clone)]
pub struct AutoRefresher {
    shutdown: CancellationToken,
    running: Arc<DashMap<RefreshKey, Running>>,
    generation: Arc<AtomicU64>,
    interval: Duration,
    max_ticks: u32,
}

impl AutoRefresher {
    pub fn new(shutdown: CancellationToken) -> Self {
        Self::with_schedule(shutdown, REFRESH_INTERVAL, MAX_REFRESHES)
    }

    pub fn with_schedule(shutdown: CancellationToken, interval: Duration, max_ticks: u32) -> Self {
        Self {
            shutdown,
            running: Arc::new(DashMap::new()),
            generation: Arc::new(AtomicU64::new(0)),
            interval,
            max_ticks,
        }
    }

    /// Start a loop that calls `tick` now and then every interval.
    ///
    /// The handle resolves to the number of successful renders.
    pub fn start<F, Fut>(&self, key: RefreshKey, mut tick: F) -> JoinHandle<u32>
    where
        F: FnMut(u32) -> Fut + Send + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        let token = self.shutdown.child_token();
        let generation = self.generation.fetch_add(1, Ordering::Relaxed);

        if let Some(previous) = self.running.insert(
            key,
            Running {
                generation,
                token: token.clone(),
            },
        ) {
            debug!("Replacing auto-refresh for {:?}", key);
            previous.token.cancel();
        }

        let running = Arc::clone(&self.running);
        let interval = self.interval;
        let max_ticks = self.max_ticks;

        tokio::spawn(async move {
            let mut rendered = 0;

            for n in 0..max_ticks {
                let result = tokio::select! {
                    biased;
                    _ = token.cancelled() => break,
                    result = tick(n) => result,
                };

                if let Err(e) = result {
                    warn!("Auto-refresh for {:?} stopped after error: {:#}", key, e);
                    break;
                }
                rendered += 1;

                if n + 1 == max_ticks {
                    break;
                }

                tokio::select! {
                    biased;
                    _ = token.cancelled() => break,
                    _ = tokio::time::sleep(interval) => {}
                }
            }

            running.remove_if(&key, |_, r| r.generation == generation);
            info!("Auto-refresh for {:?} ended after {} renders", key, rendered);
            rendered
        })
    }

    /// Cancel the loop for a message. Returns whether one was running.
    pub fn stop(&self, key: RefreshKey) -> bool {
        match self.running.remove(&key) {
            Some((_, running)) => {
                running.token.cancel();
                true
            }
            None => false,
        }
    }

    pub fn is_running(&self, key: RefreshKey) -> bool {
        self.running.contains_key(&key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::atomic::AtomicU32;

    fn counter() -> (Arc<AtomicU32>, impl FnMut(u32) -> std::future::Ready<anyhow::Result<()>> + Send + 'static) {
        let count = Arc::new(AtomicU32::new(0));
        let inner = Arc::clone(&count);
        let tick = move |_: u32| {
            inner.fetch_add(1, Ordering::SeqCst);
            std::future::ready(Ok(()))
        };
        (count, tick)
    }

    #[tokio::test(start_paused = true)]
    async fn runs_the_full_budget_then_unregisters() {
        let refresher = AutoRefresher::new(CancellationToken::new());
        let (count, tick) = counter();

        let handle = refresher.start((1, 10), tick);
        assert!(refresher.is_running((1, 10)));

        assert_eq!(handle.await.unwrap(), MAX_REFRESHES);
        assert_eq!(count.load(Ordering::SeqCst), MAX_REFRESHES);
        assert!(!refresher.is_running((1, 10)));
    }

    #[tokio::test(start_paused = true)]
    async fn stop_signal_ends_the_loop() {
        let refresher = AutoRefresher::new(CancellationToken::new());
        let (count, tick) = counter();

        let handle = refresher.start((1, 10), tick);
        // Renders at 0s, 10s and 20s.
        tokio::time::sleep(Duration::from_secs(25)).await;

        assert!(refresher.stop((1, 10)));
        assert_eq!(handle.await.unwrap(), 3);
        assert_eq!(count.load(Ordering::SeqCst), 3);
        assert!(!refresher.stop((1, 10)));
    }

    #[tokio::test(start_paused = true)]
    async fn render_error_ends_the_loop() {
        let refresher = AutoRefresher::new(CancellationToken::new());

        let handle = refresher.start((2, 20), |n| async move {
            if n == 2 {
                anyhow::bail!("message to edit not found");
            }
            Ok(())
        });

        assert_eq!(handle.await.unwrap(), 2);
        assert!(!refresher.is_running((2, 20)));
    }

    #[tokio::test(start_paused = true)]
    async fn stop_wins_over_an_elapsed_interval() {
        // A zero interval makes the pause ready at the same poll as the stop.
        for round in 0..20 {
            let refresher = AutoRefresher::with_schedule(CancellationToken::new(), Duration::ZERO, 5);
            let stopper = refresher.clone();
            let count = Arc::new(AtomicU32::new(0));
            let seen = Arc::clone(&count);
            let key = (4, round);

            let handle = refresher.start(key, move |_: u32| {
                let seen = Arc::clone(&seen);
                let stopper = stopper.clone();
                async move {
                    seen.fetch_add(1, Ordering::SeqCst);
                    stopper.stop(key);
                    Ok(())
                }
            });

            assert_eq!(handle.await.unwrap(), 1);
            assert_eq!(count.load(Ordering::SeqCst), 1);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn shutdown_cancels_every_loop() {
        let shutdown = CancellationToken::new();
        let refresher = AutoRefresher::new(shutdown.clone());
        let (_, first) = counter();
        let (_, second) = counter();

        let a = refresher.start((1, 1), first);
        let b = refresher.start((2, 2), second);
        tokio::time::sleep(Duration::from_secs(15)).await;
        shutdown.cancel();

        assert_eq!(a.await.unwrap(), 2);
        assert_eq!(b.await.unwrap(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn restarting_a_message_replaces_its_loop() {
        let refresher = AutoRefresher::with_schedule(CancellationToken::new(), Duration::from_secs(1), 5);
        let (_, first) = counter();
        let (_, second) = counter();

        let old = refresher.start((3, 30), first);
        tokio::time::sleep(Duration::from_millis(1_500)).await;
        let new = refresher.start((3, 30), second);

        assert_eq!(old.await.unwrap(), 2);
        assert!(refresher.is_running((3, 30)));
        assert_eq!(new.await.unwrap(), 5);
        assert!(!refresher.is_running((3, 30)));
    }
}
