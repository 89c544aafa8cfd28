use crate::config::ApiCredentials;
use crate::models::{Channel, Platform, RegisteredChannel};
use crate::services::{twitch_service, youtube_service};
use anyhow::Result;
use elasticsearch::{DeleteParts, Elasticsearch, IndexParts, SearchParts};
use log::{error, info};
use serde_json::{json, Value};

pub const CHANNEL_INDEX: &str = "registered_channels";

/// Resolve raw user input (ID, URL, handle, or login) against the
/// matching platform API. `Ok(None)` means the platform knows no such
/// channel.
pub async fn resolve_channel_details(
    input: &str,
    platform: Platform,
    credentials: &ApiCredentials,
) -> Result<Option<Channel>> {
    match platform {
        Platform::Youtube => {
            youtube_service::resolve_channel(input, credentials.youtube_api_key()?).await
        }
        Platform::Twitch => {
            let (client_id, client_secret) = credentials.twitch()?;
            let token = twitch_service::get_app_access_token(client_id, client_secret).await?;
            twitch_service::get_user_by_login(input, &token, client_id).await
        }
    }
}

pub async fn register_channel(
    es_client: &Elasticsearch,
    registration: &RegisteredChannel,
) -> Result<()> {
    let doc_id = format!(
        "{}:{}",
        registration.user_id, registration.channel.channel_id
    );

    es_client
        .index(IndexParts::IndexId(CHANNEL_INDEX, &doc_id))
        .body(json!(registration))
        .send()
        .await?;

    info!(
        "Registered channel: {} ({}) for user {}",
        registration.channel.channel_name,
        registration.channel.channel_id,
        registration.user_id
    );
    Ok(())
}

pub async fn list_channels(es_client: &Elasticsearch, user_id: &str) -> Result<Vec<Channel>> {
    let response = es_client
        .search(SearchParts::Index(&[CHANNEL_INDEX]))
        .body(json!({
            "query": {
                "term": {
                    "user_id": user_id
                }
            },
            "size": 1000
        }))
        .send()
        .await?;

    if !response.status_code().is_success() {
        return Err(anyhow::anyhow!(
            "Channel registry search failed with status: {}",
            response.status_code()
        ));
    }

    let response_body: Value = response.json().await?;
    let mut channels = Vec::new();

    if let Some(hits) = response_body["hits"]["hits"].as_array() {
        for hit in hits {
            match serde_json::from_value::<RegisteredChannel>(hit["_source"].clone()) {
                Ok(registration) => channels.push(registration.channel),
                Err(e) => {
                    error!("Skipping malformed registry document: {e:?}");
                }
            }
        }
    }

    Ok(channels)
}

pub async fn remove_channel(
    es_client: &Elasticsearch,
    user_id: &str,
    channel_id: &str,
) -> Result<()> {
    info!("Removing registered channel: {channel_id} for user {user_id}");

    let doc_id = format!("{user_id}:{channel_id}");
    let response = es_client
        .delete(DeleteParts::IndexId(CHANNEL_INDEX, &doc_id))
        .send()
        .await?;

    if !response.status_code().is_success() {
        return Err(anyhow::anyhow!("Channel {channel_id} not found"));
    }

    Ok(())
}
