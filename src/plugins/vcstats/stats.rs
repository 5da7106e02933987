//! Memoized active call lists.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::cache::TtlMemo;
use crate::database::ActiveChatSource;
use crate::utils::CallKind;

/// How long one fetch of both lists is served before refetching.
pub const STATS_TTL: Duration = Duration::from_secs(5);

/// Audio and video call lists fetched together.
#[derive(Debug, Clone)]
pub struct ActiveCalls {
    pub audio: Arc<[i64]>,
    pub video: Arc<[i64]>,
    pub fetched_at: DateTime<Utc>,
}

impl ActiveCalls {
    pub fn list(&self, kind: CallKind) -> &[i64] {
        match kind {
            CallKind::Audio => &self.audio,
            CallKind::Video => &self.video,
        }
    }
}

/// Call lists behind a short TTL so paging and refresh buttons don't hit
/// the database on every press.
pub struct CallStats<S> {
    source: S,
    memo: TtlMemo<ActiveCalls>,
}

impl<S: ActiveChatSource> CallStats<S> {
    pub fn new(source: S) -> Self {
        Self::with_ttl(source, STATS_TTL)
    }

    pub fn with_ttl(source: S, ttl: Duration) -> Self {
        Self {
            source,
            memo: TtlMemo::new(ttl),
        }
    }

    /// Both lists, from the memo when fresh. A failed fetch is returned as is
    /// and the memo keeps its previous pair.
    pub async fn read(&self) -> anyhow::Result<ActiveCalls> {
        self.memo
            .get_or_refresh(|| async {
                let audio = self.source.audio_chats().await?;
                let video = self.source.video_chats().await?;
                Ok::<_, anyhow::Error>(ActiveCalls {
                    audio: audio.into(),
                    video: video.into(),
                    fetched_at: Utc::now(),
                })
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    #[derive(Default)]
    struct FakeSource {
        audio_calls: AtomicUsize,
        video_calls: AtomicUsize,
        fail_video: AtomicBool,
        generation: AtomicUsize,
    }

    impl ActiveChatSource for Arc<FakeSource> {
        async fn audio_chats(&self) -> anyhow::Result<Vec<i64>> {
            self.audio_calls.fetch_add(1, Ordering::SeqCst);
            let g = self.generation.load(Ordering::SeqCst) as i64;
            Ok(vec![g * 10 + 1, g * 10 + 2])
        }

        async fn video_chats(&self) -> anyhow::Result<Vec<i64>> {
            self.video_calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_video.load(Ordering::SeqCst) {
                anyhow::bail!("video lookup failed");
            }
            let g = self.generation.load(Ordering::SeqCst) as i64;
            Ok(vec![g * 10 + 5])
        }
    }

    #[tokio::test(start_paused = true)]
    async fn reads_within_ttl_fetch_once() {
        let source = Arc::new(FakeSource::default());
        let stats = CallStats::new(source.clone());

        let first = stats.read().await.unwrap();
        source.generation.store(1, Ordering::SeqCst);
        tokio::time::advance(Duration::from_secs(3)).await;
        let second = stats.read().await.unwrap();

        assert_eq!(&*first.audio, &*second.audio);
        assert_eq!(&*second.video, &[5]);
        assert_eq!(source.audio_calls.load(Ordering::SeqCst), 1);
        assert_eq!(source.video_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn read_after_ttl_fetches_both_lists_once() {
        let source = Arc::new(FakeSource::default());
        let stats = CallStats::new(source.clone());

        stats.read().await.unwrap();
        source.generation.store(1, Ordering::SeqCst);
        tokio::time::advance(STATS_TTL + Duration::from_millis(1)).await;
        let fresh = stats.read().await.unwrap();

        assert_eq!(fresh.list(CallKind::Audio), &[11, 12]);
        assert_eq!(fresh.list(CallKind::Video), &[15]);
        assert_eq!(source.audio_calls.load(Ordering::SeqCst), 2);
        assert_eq!(source.video_calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn failed_fetch_propagates_and_next_read_retries() {
        let source = Arc::new(FakeSource::default());
        let stats = CallStats::new(source.clone());

        source.fail_video.store(true, Ordering::SeqCst);
        assert!(stats.read().await.is_err());

        source.fail_video.store(false, Ordering::SeqCst);
        let calls = stats.read().await.unwrap();
        assert_eq!(calls.list(CallKind::Video), &[5]);
        assert_eq!(source.audio_calls.load(Ordering::SeqCst), 2);
    }
}
