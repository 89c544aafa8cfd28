use crate::config::ApiCredentials;
use crate::models::{Channel, Platform, StreamRecord, StreamStatus};
use crate::services::stream_cache::StreamCache;
use crate::services::{twitch_service, youtube_service};
use crate::utils::{compare_with_order_int, parse_iso8601_to_timestamp};
use anyhow::Result;
use futures::future::{join_all, BoxFuture};
use futures::FutureExt;
use log::{error, info};
use std::collections::{HashMap, HashSet};

pub enum SortOrder {
    Asc,
    Desc,
}

/// Schedule view tabs. Each keeps exactly one status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Live,
    Upcoming,
    Ended,
}

impl Tab {
    pub fn status(&self) -> StreamStatus {
        match self {
            Tab::Live => StreamStatus::Live,
            Tab::Upcoming => StreamStatus::Upcoming,
            Tab::Ended => StreamStatus::Ended,
        }
    }
}

/// One aggregation pass: fan out to both platforms for every registered
/// channel, wait for all tasks to settle, and merge whatever succeeded.
///
/// YouTube takes one channel per call, Twitch takes the whole user-id
/// set in one batch, so the task list is N YouTube tasks plus at most
/// one Twitch task. A failed task is logged and contributes nothing;
/// only a missing credential fails the pass as a whole.
pub async fn collect_streams(
    channels: &[Channel],
    credentials: &ApiCredentials,
    cache: &StreamCache,
) -> Result<Vec<StreamRecord>> {
    // Every secret is demanded before the first network call; a
    // half-credentialed pass fails whole instead of returning partial
    // data.
    let youtube_api_key = credentials.youtube_api_key()?;
    let (twitch_client_id, twitch_client_secret) = credentials.twitch()?;

    if channels.is_empty() {
        return Ok(Vec::new());
    }

    let youtube_ids: Vec<String> = channels
        .iter()
        .filter(|c| c.platform == Platform::Youtube)
        .map(|c| c.channel_id.clone())
        .collect();
    let twitch_ids: Vec<String> = channels
        .iter()
        .filter(|c| c.platform == Platform::Twitch)
        .map(|c| c.channel_id.clone())
        .collect();

    let mut tasks: Vec<BoxFuture<'_, Result<Vec<StreamRecord>>>> = Vec::new();

    for channel_id in &youtube_ids {
        tasks.push(
            async move {
                let key = StreamCache::youtube_key(channel_id);
                cache
                    .get_or_fetch(&key, || {
                        youtube_service::fetch_streams(channel_id, youtube_api_key)
                    })
                    .await
            }
            .boxed(),
        );
    }

    if !twitch_ids.is_empty() {
        let twitch_ids = &twitch_ids;
        tasks.push(
            async move {
                // App token lives for one pass only.
                let token =
                    twitch_service::get_app_access_token(twitch_client_id, twitch_client_secret)
                        .await?;
                let key = StreamCache::twitch_key(twitch_ids);
                cache
                    .get_or_fetch(&key, || {
                        twitch_service::fetch_streams(twitch_ids, &token, twitch_client_id)
                    })
                    .await
            }
            .boxed(),
        );
    }

    let task_count = tasks.len();
    let results = join_all(tasks).await;
    let mut streams = merge_settled(results);
    info!(
        "Aggregation pass: {} streams from {} fetch tasks",
        streams.len(),
        task_count
    );

    attach_channel_icons(&mut streams, channels);
    Ok(streams)
}

/// Fan-in: concatenate the successful task results, drop and log the
/// failed ones, and de-duplicate by video ID keeping first occurrence.
pub fn merge_settled(results: Vec<Result<Vec<StreamRecord>>>) -> Vec<StreamRecord> {
    let mut merged = Vec::new();
    let mut seen = HashSet::new();

    for result in results {
        match result {
            Ok(streams) => {
                for stream in streams {
                    if seen.insert(stream.video_id.clone()) {
                        merged.push(stream);
                    }
                }
            }
            Err(e) => {
                error!("Stream fetch task failed: {e:?}");
            }
        }
    }

    merged
}

/// Join the registered channels' avatars onto the merged records by
/// broadcaster ID. Records from channels no longer registered keep an
/// empty icon.
pub fn attach_channel_icons(streams: &mut [StreamRecord], channels: &[Channel]) {
    let icons: HashMap<&str, &str> = channels
        .iter()
        .map(|c| (c.channel_id.as_str(), c.thumbnail_url.as_str()))
        .collect();

    for stream in streams {
        if let Some(icon) = icons.get(stream.channel_id.as_str()) {
            stream.channel_icon_url = (*icon).to_string();
        }
    }
}

/// Keep only the records belonging on the given tab.
pub fn filter_by_tab(streams: Vec<StreamRecord>, tab: Tab) -> Vec<StreamRecord> {
    let status = tab.status();
    streams.into_iter().filter(|s| s.status == status).collect()
}

/// Order the tab's records: most recently ended first, soonest live or
/// upcoming first. Stable; ties keep their input order.
pub fn sort_for_tab(streams: &mut [StreamRecord], tab: Tab) {
    let order = match tab {
        Tab::Ended => SortOrder::Desc,
        Tab::Live | Tab::Upcoming => SortOrder::Asc,
    };

    streams.sort_by(|a, b| {
        compare_with_order_int(
            parse_iso8601_to_timestamp(&a.date_time),
            parse_iso8601_to_timestamp(&b.date_time),
            &order,
        )
    });
}
