use crate::config::ApiCredentials;
use crate::models::{ErrorResponse, StreamRecord, UserToken};
use crate::services::channel_service;
use crate::services::schedule_service::{self, Tab};
use crate::AppState;
use log::error;
use rocket::serde::json::Json;
use rocket::{get, State};

/// Aggregated schedule for the caller's registered channels, filtered
/// and ordered for one tab. An empty list is a normal result; only a
/// credential or registry failure produces an error body.
#[get("/?<tab>")]
pub async fn get_schedule(
    tab: Option<String>,
    user: UserToken,
    state: &State<AppState>,
) -> Result<Json<Vec<StreamRecord>>, ErrorResponse> {
    let tab = match tab.as_deref() {
        Some("upcoming") => Tab::Upcoming,
        Some("ended") => Tab::Ended,
        _ => Tab::Live,
    };

    let credentials = ApiCredentials::from_env();

    let channels = channel_service::list_channels(&state.es_client, &user.0)
        .await
        .map_err(|e| {
            error!("Channel registry lookup failed: {e:?}");
            ErrorResponse {
                error: "Channel registry unavailable".to_string(),
                message: e.to_string(),
            }
        })?;

    let streams = schedule_service::collect_streams(&channels, &credentials, &state.cache)
        .await
        .map_err(|e| {
            error!("Aggregation pass failed: {e:?}");
            ErrorResponse {
                error: "Stream aggregation failed".to_string(),
                message: e.to_string(),
            }
        })?;

    let mut streams = schedule_service::filter_by_tab(streams, tab);
    schedule_service::sort_for_tab(&mut streams, tab);

    Ok(Json(streams))
}
