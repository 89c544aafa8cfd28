use crate::models::StreamRecord;
use anyhow::Result;
use log::info;
use std::collections::HashMap;
use std::future::Future;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

struct CacheEntry {
    streams: Vec<StreamRecord>,
    stored_at: Instant,
}

/// Time-boxed memoization of upstream stream listings, keyed by the
/// channel-id (YouTube) or the sorted user-id set (Twitch). Entries are
/// overwritten on refresh and never evicted; the keyspace is bounded by
/// the channel sets one process actually queries.
///
/// Two callers racing on the same stale key may both call through. The
/// fetchers are idempotent reads, so the duplicate call is wasted work,
/// not a correctness problem.
pub struct StreamCache {
    ttl: Duration,
    entries: RwLock<HashMap<String, CacheEntry>>,
}

impl StreamCache {
    pub fn new(ttl: Duration) -> Self {
        StreamCache {
            ttl,
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Build the cache key for a batched Twitch lookup. Sorted so the
    /// same channel set always maps to the same entry.
    pub fn twitch_key(user_ids: &[String]) -> String {
        let mut ids: Vec<&str> = user_ids.iter().map(String::as_str).collect();
        ids.sort_unstable();
        format!("twitch:{}", ids.join(","))
    }

    pub fn youtube_key(channel_id: &str) -> String {
        format!("youtube:{channel_id}")
    }

    async fn get_fresh(&self, key: &str) -> Option<Vec<StreamRecord>> {
        let entries = self.entries.read().await;
        let entry = entries.get(key)?;
        if entry.stored_at.elapsed() < self.ttl {
            Some(entry.streams.clone())
        } else {
            None
        }
    }

    /// Return the stored value while it is younger than the TTL,
    /// otherwise call `fetcher` and store its result. A failed fetch is
    /// propagated and leaves any stale entry untouched.
    pub async fn get_or_fetch<F, Fut>(&self, key: &str, fetcher: F) -> Result<Vec<StreamRecord>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Vec<StreamRecord>>>,
    {
        if let Some(streams) = self.get_fresh(key).await {
            info!("Cache hit for '{key}' ({} streams)", streams.len());
            return Ok(streams);
        }

        let streams = fetcher().await?;

        let mut entries = self.entries.write().await;
        entries.insert(
            key.to_string(),
            CacheEntry {
                streams: streams.clone(),
                stored_at: Instant::now(),
            },
        );

        Ok(streams)
    }

    /// Age an entry artificially, for TTL tests.
    #[cfg(test)]
    async fn backdate(&self, key: &str, age: Duration) {
        let mut entries = self.entries.write().await;
        if let Some(entry) = entries.get_mut(key) {
            entry.stored_at = Instant::now() - age;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Platform, StreamStatus};
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn record(video_id: &str) -> StreamRecord {
        StreamRecord {
            video_id: video_id.to_string(),
            channel_id: "UCchannel".to_string(),
            title: "title".to_string(),
            channel_name: "channel".to_string(),
            channel_icon_url: String::new(),
            thumbnail_url: String::new(),
            date_time: "2025-01-01T00:00:00Z".to_string(),
            status: StreamStatus::Live,
            stream_url: String::new(),
            platform: Platform::Youtube,
        }
    }

    #[tokio::test]
    async fn test_second_read_within_ttl_skips_fetcher() {
        let cache = StreamCache::new(Duration::from_secs(300));
        let calls = AtomicUsize::new(0);

        for _ in 0..2 {
            let streams = cache
                .get_or_fetch("youtube:abc", || async {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok(vec![record("v1")])
                })
                .await
                .unwrap();
            assert_eq!(streams.len(), 1);
            assert_eq!(streams[0].video_id, "v1");
        }

        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_expired_entry_triggers_one_refetch() {
        let cache = StreamCache::new(Duration::from_secs(300));
        let calls = AtomicUsize::new(0);

        let fetch = |id: &'static str| {
            let calls = &calls;
            move || async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok(vec![record(id)])
            }
        };

        cache.get_or_fetch("k", fetch("v1")).await.unwrap();

        // 299s of age: still fresh.
        cache.backdate("k", Duration::from_secs(299)).await;
        let streams = cache.get_or_fetch("k", fetch("v2")).await.unwrap();
        assert_eq!(streams[0].video_id, "v1");
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        // 301s of age: stale, exactly one new fetch.
        cache.backdate("k", Duration::from_secs(301)).await;
        let streams = cache.get_or_fetch("k", fetch("v2")).await.unwrap();
        assert_eq!(streams[0].video_id, "v2");
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_failed_fetch_is_not_cached() {
        let cache = StreamCache::new(Duration::from_secs(300));
        let calls = AtomicUsize::new(0);

        let result = cache
            .get_or_fetch("k", || async {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(anyhow::anyhow!("upstream down"))
            })
            .await;
        assert!(result.is_err());

        let streams = cache
            .get_or_fetch("k", || async {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok(vec![record("v1")])
            })
            .await
            .unwrap();
        assert_eq!(streams.len(), 1);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_twitch_key_is_order_independent() {
        let a = StreamCache::twitch_key(&["42".to_string(), "7".to_string()]);
        let b = StreamCache::twitch_key(&["7".to_string(), "42".to_string()]);
        assert_eq!(a, b);
        assert_eq!(a, "twitch:42,7");
    }
}
