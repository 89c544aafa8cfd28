use crate::config::ApiCredentials;
use crate::models::{Channel, ChannelListResponse, NewChannelRequest, RegisteredChannel, UserToken};
use crate::services::channel_service;
use crate::AppState;
use log::error;
use rocket::http::Status;
use rocket::serde::json::Json;
use rocket::{delete, get, post, State};

#[post("/", data = "<channel>")]
pub async fn add_channel(
    channel: Json<NewChannelRequest>,
    user: UserToken,
    state: &State<AppState>,
) -> Result<(Status, Json<Channel>), Status> {
    let request = channel.into_inner();
    if request.input.trim().is_empty() {
        return Err(Status::BadRequest);
    }

    let credentials = ApiCredentials::from_env();

    let resolved =
        match channel_service::resolve_channel_details(&request.input, request.platform, &credentials)
            .await
        {
            Ok(Some(details)) => details,
            Ok(None) => return Err(Status::NotFound),
            Err(e) => {
                error!(
                    "Failed to resolve channel '{}' on {}: {e:?}",
                    request.input, request.platform
                );
                return Err(Status::InternalServerError);
            }
        };

    let registration = RegisteredChannel {
        user_id: user.0,
        channel: resolved.clone(),
        created_at: chrono::Utc::now().to_rfc3339(),
    };

    match channel_service::register_channel(&state.es_client, &registration).await {
        Ok(_) => Ok((Status::Created, Json(resolved))),
        Err(e) => {
            error!("Failed to store channel registration: {e:?}");
            Err(Status::InternalServerError)
        }
    }
}

#[get("/")]
pub async fn get_channels(
    user: UserToken,
    state: &State<AppState>,
) -> Result<Json<ChannelListResponse>, Status> {
    match channel_service::list_channels(&state.es_client, &user.0).await {
        Ok(channels) => Ok(Json(ChannelListResponse { channels })),
        Err(e) => {
            error!("Failed to list registered channels: {e:?}");
            Err(Status::InternalServerError)
        }
    }
}

#[delete("/<channel_id>")]
pub async fn remove_channel(
    channel_id: &str,
    user: UserToken,
    state: &State<AppState>,
) -> Result<Status, Status> {
    if channel_id.is_empty() {
        return Err(Status::BadRequest);
    }

    match channel_service::remove_channel(&state.es_client, &user.0, channel_id).await {
        Ok(_) => Ok(Status::NoContent),
        Err(e) => {
            error!("Failed to remove channel {channel_id}: {e:?}");
            Err(Status::NotFound)
        }
    }
}
