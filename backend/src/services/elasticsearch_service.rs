use crate::services::channel_service::CHANNEL_INDEX;
use elasticsearch::{indices::IndicesCreateParts, Elasticsearch};
use log::{error, info};
use serde_json::json;

pub async fn create_es_index(es_client: &Elasticsearch) {
    let create_index_body = json!({
        "mappings": {
            "properties": {
                "user_id": { "type": "keyword" },
                "channel_id": { "type": "keyword" },
                "channel_name": { "type": "text" },
                "thumbnail_url": { "type": "keyword" },
                "platform": { "type": "keyword" },
                "created_at": { "type": "date" }
            }
        }
    });

    match es_client
        .indices()
        .create(IndicesCreateParts::Index(CHANNEL_INDEX))
        .body(create_index_body)
        .send()
        .await
    {
        Ok(response) => {
            if response.status_code().is_success() {
                info!("Elasticsearch index '{CHANNEL_INDEX}' created or already exists.");
            } else {
                let response_text = response.text().await.unwrap_or_default();
                if response_text.contains("resource_already_exists_exception") {
                    info!("Elasticsearch index '{CHANNEL_INDEX}' already exists.");
                } else {
                    error!("Failed to create Elasticsearch index: {response_text}");
                }
            }
        }
        Err(e) => {
            error!("Failed to connect to Elasticsearch to create index: {e:?}");
        }
    }
}
