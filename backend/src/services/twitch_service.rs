use crate::models::{Channel, Platform, StreamRecord, StreamStatus};
use anyhow::Result;
use log::info;
use reqwest::header::AUTHORIZATION;
use reqwest::Client;
use serde_json::Value;

const TWITCH_API_BASE_URL: &str = "https://api.twitch.tv/helix";
const TWITCH_AUTH_BASE_URL: &str = "https://id.twitch.tv/oauth2";

/// Obtain a short-lived app access token via the client-credentials
/// grant. Re-acquired on every aggregation pass; no expiry tracking.
pub async fn get_app_access_token(client_id: &str, client_secret: &str) -> Result<String> {
    let client = Client::new();
    let params = [
        ("client_id", client_id),
        ("client_secret", client_secret),
        ("grant_type", "client_credentials"),
    ];

    let response = client
        .post(format!("{TWITCH_AUTH_BASE_URL}/token"))
        .form(&params)
        .send()
        .await?;

    if !response.status().is_success() {
        let error_text = response.text().await.unwrap_or_default();
        return Err(anyhow::anyhow!(
            "Twitch token request failed: {error_text}"
        ));
    }

    let body = response.json::<Value>().await?;
    body["access_token"]
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| anyhow::anyhow!("Twitch token response carried no access_token"))
}

/// Look up a Twitch user by login name. `Ok(None)` means no such user.
pub async fn get_user_by_login(
    login: &str,
    access_token: &str,
    client_id: &str,
) -> Result<Option<Channel>> {
    let client = Client::new();

    let response = client
        .get(format!("{TWITCH_API_BASE_URL}/users?login={login}"))
        .header(AUTHORIZATION, format!("Bearer {access_token}"))
        .header("Client-Id", client_id)
        .send()
        .await?;

    if !response.status().is_success() {
        let error_text = response.text().await.unwrap_or_default();
        return Err(anyhow::anyhow!("Twitch user lookup failed: {error_text}"));
    }

    let body = response.json::<Value>().await?;
    let user = match body
        .get("data")
        .and_then(|d| d.as_array())
        .and_then(|arr| arr.first())
    {
        Some(user) => user,
        None => return Ok(None),
    };

    Ok(Some(Channel {
        channel_id: user["id"].as_str().unwrap_or_default().to_string(),
        channel_name: user["display_name"]
            .as_str()
            .or_else(|| user["login"].as_str())
            .unwrap_or_default()
            .to_string(),
        thumbnail_url: user["profile_image_url"]
            .as_str()
            .unwrap_or_default()
            .to_string(),
        platform: Platform::Twitch,
    }))
}

/// One batched streams lookup for the whole registered user-id set.
/// Helix only reports broadcasts that are live right now; upcoming and
/// ended never appear here.
pub async fn fetch_streams(
    user_ids: &[String],
    access_token: &str,
    client_id: &str,
) -> Result<Vec<StreamRecord>> {
    if user_ids.is_empty() {
        return Ok(Vec::new());
    }

    let query = user_ids
        .iter()
        .map(|id| format!("user_id={id}"))
        .collect::<Vec<_>>()
        .join("&");

    let client = Client::new();
    let response = client
        .get(format!("{TWITCH_API_BASE_URL}/streams?{query}"))
        .header(AUTHORIZATION, format!("Bearer {access_token}"))
        .header("Client-Id", client_id)
        .send()
        .await?;

    if !response.status().is_success() {
        let error_text = response.text().await.unwrap_or_default();
        return Err(anyhow::anyhow!("Twitch streams lookup failed: {error_text}"));
    }

    let body = response.json::<Value>().await?;
    let streams = normalize_helix_streams(&body);
    info!("Twitch reported {} live broadcasts", streams.len());
    Ok(streams)
}

/// Map the Helix streams payload onto stream records.
pub fn normalize_helix_streams(response: &Value) -> Vec<StreamRecord> {
    let data = match response.get("data").and_then(|d| d.as_array()) {
        Some(data) => data,
        None => return Vec::new(),
    };

    data.iter()
        .filter_map(|stream| {
            let video_id = stream["id"].as_str()?.to_string();
            let user_name = stream["user_name"].as_str().unwrap_or_default();
            let user_login = stream["user_login"].as_str().unwrap_or(user_name);

            Some(StreamRecord {
                video_id,
                channel_id: stream["user_id"].as_str().unwrap_or_default().to_string(),
                title: stream["title"].as_str().unwrap_or_default().to_string(),
                channel_name: user_name.to_string(),
                // Joined against the registry after the fan-in.
                channel_icon_url: String::new(),
                thumbnail_url: stream["thumbnail_url"]
                    .as_str()
                    .unwrap_or_default()
                    .replace("{width}", "480")
                    .replace("{height}", "270"),
                date_time: stream["started_at"].as_str().unwrap_or_default().to_string(),
                status: StreamStatus::Live,
                stream_url: format!("https://www.twitch.tv/{user_login}"),
                platform: Platform::Twitch,
            })
        })
        .collect()
}
