use crate::models::{Channel, Platform, StreamRecord, StreamStatus};
use anyhow::Result;
use log::{error, info};
use reqwest::Client;
use serde_json::Value;

const YOUTUBE_API_BASE_URL: &str = "https://www.googleapis.com/youtube/v3";

#[derive(Debug, PartialEq, Eq)]
enum ChannelInput {
    Id(String),
    Handle(String),
}

/// Classify raw input as a channel ID or a handle. Accepts a full
/// channel URL, a handle URL, a bare @handle, or the ID itself.
fn parse_channel_input(input: &str) -> ChannelInput {
    if input.contains("/channel/") {
        // Format: https://www.youtube.com/channel/UCTeLqJq1mXUX5WWoNXLmOIA
        let id = input
            .split("/channel/")
            .nth(1)
            .unwrap_or_default()
            .trim_end_matches('/');
        return ChannelInput::Id(id.to_string());
    }

    let handle = if input.contains("/@") {
        // Format: https://youtube.com/@RobertsSpaceInd
        input.split("/@").nth(1)
    } else {
        input.strip_prefix('@')
    };

    match handle {
        Some(handle) => ChannelInput::Handle(handle.trim_end_matches('/').to_string()),
        // Anything else is treated as a literal channel ID.
        None => ChannelInput::Id(input.to_string()),
    }
}

/// Pull the channel ID out of a channels-endpoint payload; empty
/// `items` means the handle matched nothing.
fn channel_id_from_lookup(response: &Value) -> Option<String> {
    response["items"][0]["id"].as_str().map(str::to_string)
}

/// Reduce the accepted input forms to a channel ID. `Ok(None)` means
/// the input was a handle the API knows no channel for.
async fn resolve_channel_id(input: &str, api_key: &str) -> Result<Option<String>> {
    match parse_channel_input(input) {
        ChannelInput::Id(id) => Ok(Some(id)),
        ChannelInput::Handle(handle) => {
            // Get channel ID from handle via API
            let url = format!(
                "{}/channels?part=id&forHandle={}&key={}",
                YOUTUBE_API_BASE_URL, handle, api_key
            );
            let client = Client::new();
            let response = client.get(&url).send().await?.json::<Value>().await?;
            Ok(channel_id_from_lookup(&response))
        }
    }
}

/// Look up a channel by ID, URL, or handle. `Ok(None)` means the API
/// answered but knows no such channel.
pub async fn resolve_channel(input: &str, api_key: &str) -> Result<Option<Channel>> {
    let channel_id = match resolve_channel_id(input, api_key).await? {
        Some(id) => id,
        None => return Ok(None),
    };

    let client = Client::new();
    let url = format!(
        "{}/channels?part=snippet&id={}&key={}",
        YOUTUBE_API_BASE_URL, channel_id, api_key
    );

    let response = client.get(&url).send().await?.json::<Value>().await?;

    let item = match response["items"].as_array().and_then(|items| items.first()) {
        Some(item) => item,
        None => return Ok(None),
    };

    Ok(Some(Channel {
        channel_id: item["id"].as_str().unwrap_or(&channel_id).to_string(),
        channel_name: item["snippet"]["title"]
            .as_str()
            .ok_or_else(|| anyhow::anyhow!("Invalid channel title"))?
            .to_string(),
        thumbnail_url: item["snippet"]["thumbnails"]["default"]["url"]
            .as_str()
            .unwrap_or_default()
            .to_string(),
        platform: Platform::Youtube,
    }))
}

/// Snapshot of one channel's current and near-term broadcasts.
///
/// Two calls: the search endpoint only yields candidate video IDs, the
/// videos endpoint carries the liveStreamingDetails needed to tell
/// live, upcoming, and ended apart.
pub async fn fetch_streams(channel_id: &str, api_key: &str) -> Result<Vec<StreamRecord>> {
    let client = Client::new();

    let search_url = format!(
        "{}/search?part=id&channelId={}&type=video&order=date&maxResults=10&key={}",
        YOUTUBE_API_BASE_URL, channel_id, api_key
    );

    let search_response = client
        .get(&search_url)
        .send()
        .await?
        .json::<Value>()
        .await?;

    if let Some(api_error) = search_response["error"]["message"].as_str() {
        return Err(anyhow::anyhow!("YouTube search failed: {api_error}"));
    }

    let video_ids: Vec<&str> = search_response["items"]
        .as_array()
        .map(|items| {
            items
                .iter()
                .filter_map(|item| item["id"]["videoId"].as_str())
                .collect()
        })
        .unwrap_or_default();

    if video_ids.is_empty() {
        info!("No broadcast candidates found for channel {channel_id}");
        return Ok(Vec::new());
    }

    let videos_url = format!(
        "{}/videos?part=snippet,liveStreamingDetails&id={}&key={}",
        YOUTUBE_API_BASE_URL,
        video_ids.join(","),
        api_key
    );

    let videos_response = client
        .get(&videos_url)
        .send()
        .await?
        .json::<Value>()
        .await?;

    if let Some(api_error) = videos_response["error"]["message"].as_str() {
        error!("YouTube video detail lookup failed: {api_error}");
        return Err(anyhow::anyhow!("YouTube video lookup failed: {api_error}"));
    }

    Ok(normalize_video_items(&videos_response))
}

/// Map the videos-endpoint payload onto stream records. Items without
/// liveStreamingDetails are plain uploads and are skipped.
pub fn normalize_video_items(response: &Value) -> Vec<StreamRecord> {
    let items = match response["items"].as_array() {
        Some(items) => items,
        None => return Vec::new(),
    };

    let mut streams = Vec::new();
    for item in items {
        let live_details = &item["liveStreamingDetails"];
        if !live_details.is_object() {
            continue;
        }

        let video_id = match item["id"].as_str() {
            Some(id) => id.to_string(),
            None => continue,
        };

        let snippet = &item["snippet"];

        let (status, date_time) = if let Some(end) = live_details["actualEndTime"].as_str() {
            (StreamStatus::Ended, end)
        } else if let Some(start) = live_details["actualStartTime"].as_str() {
            (StreamStatus::Live, start)
        } else if let Some(scheduled) = live_details["scheduledStartTime"].as_str() {
            (StreamStatus::Upcoming, scheduled)
        } else {
            (
                StreamStatus::Ended,
                snippet["publishedAt"].as_str().unwrap_or_default(),
            )
        };

        let thumbnail_url = snippet["thumbnails"]["high"]["url"]
            .as_str()
            .or_else(|| snippet["thumbnails"]["medium"]["url"].as_str())
            .or_else(|| snippet["thumbnails"]["default"]["url"].as_str())
            .unwrap_or_default();

        streams.push(StreamRecord {
            stream_url: format!("https://www.youtube.com/watch?v={video_id}"),
            video_id,
            channel_id: snippet["channelId"].as_str().unwrap_or_default().to_string(),
            title: snippet["title"].as_str().unwrap_or_default().to_string(),
            channel_name: snippet["channelTitle"]
                .as_str()
                .unwrap_or_default()
                .to_string(),
            // Joined against the registry after the fan-in.
            channel_icon_url: String::new(),
            thumbnail_url: thumbnail_url.to_string(),
            date_time: date_time.to_string(),
            status,
            platform: Platform::Youtube,
        });
    }

    streams
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn video_item(id: &str, live_details: Value) -> Value {
        json!({
            "id": id,
            "snippet": {
                "title": "Stream title",
                "channelId": "UCchannel",
                "channelTitle": "Some Channel",
                "publishedAt": "2025-01-01T00:00:00Z",
                "thumbnails": {
                    "default": { "url": "https://img.example/default.jpg" },
                    "medium": { "url": "https://img.example/medium.jpg" },
                    "high": { "url": "https://img.example/high.jpg" }
                }
            },
            "liveStreamingDetails": live_details
        })
    }

    #[test]
    fn test_parse_channel_input_forms() {
        assert_eq!(
            parse_channel_input("https://www.youtube.com/channel/UCTeLqJq1mXUX5WWoNXLmOIA"),
            ChannelInput::Id("UCTeLqJq1mXUX5WWoNXLmOIA".to_string())
        );
        assert_eq!(
            parse_channel_input("https://www.youtube.com/channel/UCTeLqJq1mXUX5WWoNXLmOIA/"),
            ChannelInput::Id("UCTeLqJq1mXUX5WWoNXLmOIA".to_string())
        );
        assert_eq!(
            parse_channel_input("UCvUc0m317LWTTPZoBQV479A"),
            ChannelInput::Id("UCvUc0m317LWTTPZoBQV479A".to_string())
        );
        assert_eq!(
            parse_channel_input("https://youtube.com/@RobertsSpaceInd"),
            ChannelInput::Handle("RobertsSpaceInd".to_string())
        );
        assert_eq!(
            parse_channel_input("@RobertsSpaceInd"),
            ChannelInput::Handle("RobertsSpaceInd".to_string())
        );
    }

    #[test]
    fn test_channel_id_from_lookup_treats_empty_items_as_not_found() {
        assert_eq!(channel_id_from_lookup(&json!({ "items": [] })), None);
        assert_eq!(channel_id_from_lookup(&json!({})), None);
        assert_eq!(
            channel_id_from_lookup(&json!({ "items": [{ "id": "UCabc" }] })),
            Some("UCabc".to_string())
        );
    }

    #[test]
    fn test_classifies_ended_live_and_upcoming() {
        let response = json!({ "items": [
            video_item("ended", json!({
                "scheduledStartTime": "2025-02-01T10:00:00Z",
                "actualStartTime": "2025-02-01T10:01:00Z",
                "actualEndTime": "2025-02-01T12:00:00Z"
            })),
            video_item("live", json!({
                "scheduledStartTime": "2025-02-02T10:00:00Z",
                "actualStartTime": "2025-02-02T10:00:30Z"
            })),
            video_item("upcoming", json!({
                "scheduledStartTime": "2025-02-03T10:00:00Z"
            })),
        ]});

        let streams = normalize_video_items(&response);
        assert_eq!(streams.len(), 3);

        assert_eq!(streams[0].status, StreamStatus::Ended);
        assert_eq!(streams[0].date_time, "2025-02-01T12:00:00Z");

        assert_eq!(streams[1].status, StreamStatus::Live);
        assert_eq!(streams[1].date_time, "2025-02-02T10:00:30Z");

        assert_eq!(streams[2].status, StreamStatus::Upcoming);
        assert_eq!(streams[2].date_time, "2025-02-03T10:00:00Z");
    }

    #[test]
    fn test_skips_items_without_live_streaming_details() {
        let response = json!({ "items": [
            {
                "id": "plain-upload",
                "snippet": { "title": "Not a stream" }
            },
            video_item("v1", json!({ "actualStartTime": "2025-02-02T10:00:00Z" })),
        ]});

        let streams = normalize_video_items(&response);
        assert_eq!(streams.len(), 1);
        assert_eq!(streams[0].video_id, "v1");
    }

    #[test]
    fn test_prefers_high_resolution_thumbnail() {
        let response = json!({ "items": [
            video_item("v1", json!({ "actualStartTime": "2025-02-02T10:00:00Z" })),
        ]});

        let streams = normalize_video_items(&response);
        assert_eq!(streams[0].thumbnail_url, "https://img.example/high.jpg");
        assert_eq!(
            streams[0].stream_url,
            "https://www.youtube.com/watch?v=v1"
        );
    }
}
