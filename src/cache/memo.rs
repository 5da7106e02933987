//! Single-slot memo with a fixed time-to-live.

use std::future::Future;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::time::Instant;

/// Holds one value for `ttl` after it was requested.
///
/// A read inside the window returns a clone of the stored value without
/// calling the refresh closure. A read after the window runs the closure and
/// swaps the new value and its timestamp in together. A failed refresh
/// leaves the slot as it was and hands the error back.
///
/// Concurrent readers that all find the slot stale will each run their own
/// refresh; the last one to finish wins the slot. There is no single-flight.
pub struct TtlMemo<T> {
    ttl: Duration,
    slot: Mutex<Option<Entry<T>>>,
}

struct Entry<T> {
    requested_at: Instant,
    value: T,
}

impl<T: Clone> TtlMemo<T> {
    /// Create an empty memo. The first read always refreshes.
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            slot: Mutex::new(None),
        }
    }

    /// The stored value, if it is still inside the TTL window.
    pub fn fresh(&self) -> Option<T> {
        let slot = self.slot.lock();
        slot.as_ref()
            .filter(|entry| entry.requested_at.elapsed() <= self.ttl)
            .map(|entry| entry.value.clone())
    }

    /// Return the stored value if fresh, otherwise run `refresh` and store
    /// its result.
    ///
    /// The lock is never held across the await.
    pub async fn get_or_refresh<F, Fut, E>(&self, refresh: F) -> Result<T, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        if let Some(value) = self.fresh() {
            return Ok(value);
        }

        let requested_at = Instant::now();
        let value = refresh().await?;

        *self.slot.lock() = Some(Entry {
            requested_at,
            value: value.clone(),
        });

        Ok(value)
    }
}

impl<T> std::fmt::Debug for TtlMemo<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TtlMemo")
            .field("ttl", &self.ttl)
            .field("filled", &self.slot.lock().is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn counting(calls: &AtomicUsize, value: u32) -> Result<u32, String> {
        calls.fetch_add(1, Ordering::SeqCst);
        Ok(value)
    }

    #[tokio::test(start_paused = true)]
    async fn first_read_refreshes_then_serves_from_slot() {
        let memo = TtlMemo::new(Duration::from_secs(5));
        let calls = AtomicUsize::new(0);

        let first = memo.get_or_refresh(|| async { counting(&calls, 1) }).await;
        tokio::time::advance(Duration::from_secs(5)).await;
        let second = memo.get_or_refresh(|| async { counting(&calls, 2) }).await;

        assert_eq!(first, Ok(1));
        assert_eq!(second, Ok(1));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn read_after_ttl_refreshes_once() {
        let memo = TtlMemo::new(Duration::from_secs(5));
        let calls = AtomicUsize::new(0);

        memo.get_or_refresh(|| async { counting(&calls, 1) })
            .await
            .unwrap();
        tokio::time::advance(Duration::from_millis(5_001)).await;

        let value = memo.get_or_refresh(|| async { counting(&calls, 2) }).await;
        assert_eq!(value, Ok(2));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(memo.fresh(), Some(2));
    }

    #[tokio::test(start_paused = true)]
    async fn failed_refresh_keeps_previous_slot() {
        let memo = TtlMemo::new(Duration::from_secs(5));
        memo.get_or_refresh(|| async { Ok::<_, String>(Arc::new(vec![1, 2])) })
            .await
            .unwrap();

        tokio::time::advance(Duration::from_secs(6)).await;
        let err = memo
            .get_or_refresh(|| async { Err::<Arc<Vec<i32>>, _>("upstream down".to_string()) })
            .await;
        assert_eq!(err, Err("upstream down".to_string()));

        // Stale, so not served, but the next success replaces it cleanly.
        assert!(memo.fresh().is_none());
        let value = memo
            .get_or_refresh(|| async { Ok::<_, String>(Arc::new(vec![3])) })
            .await
            .unwrap();
        assert_eq!(*value, vec![3]);
    }

    #[tokio::test(start_paused = true)]
    async fn values_inside_window_are_the_same_allocation() {
        let memo = TtlMemo::new(Duration::from_secs(5));
        let a = memo
            .get_or_refresh(|| async { Ok::<_, String>(Arc::new(vec![10, 20])) })
            .await
            .unwrap();
        let b = memo
            .get_or_refresh(|| async { Ok::<_, String>(Arc::new(vec![99])) })
            .await
            .unwrap();
        assert!(Arc::ptr_eq(&a, &b));
    }
}
