use rocket::http::{ContentType, Status};
use rocket::request::Request;
use rocket::response::Responder;
use rocket::serde::{Deserialize, Serialize};
use rocket::{response, Response};
use std::fmt;
use std::io::Cursor;

/// Opaque caller identity extracted from the Authorization header.
/// Token verification itself is delegated to the external auth service.
#[derive(Debug, Serialize, Deserialize)]
pub struct UserToken(pub String);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Youtube,
    Twitch,
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Platform::Youtube => write!(f, "youtube"),
            Platform::Twitch => write!(f, "twitch"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StreamStatus {
    Live,
    Upcoming,
    Ended,
}

/// A followed broadcaster, as resolved from its platform API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Channel {
    pub channel_id: String,
    pub channel_name: String,
    pub thumbnail_url: String,
    pub platform: Platform,
}

/// Registry document: a channel registration scoped to one user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisteredChannel {
    pub user_id: String,
    #[serde(flatten)]
    pub channel: Channel,
    pub created_at: String,
}

/// One normalized broadcast event, built fresh on every aggregation pass.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StreamRecord {
    pub video_id: String,
    /// Broadcaster identifier on the source platform (YouTube channel
    /// ID, Twitch user ID); join key for the registry icon lookup.
    pub channel_id: String,
    pub title: String,
    pub channel_name: String,
    pub channel_icon_url: String,
    pub thumbnail_url: String,
    /// ISO-8601 instant; scheduled start for upcoming, actual start for
    /// live, actual end for ended.
    pub date_time: String,
    pub status: StreamStatus,
    pub stream_url: String,
    pub platform: Platform,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct NewChannelRequest {
    pub input: String,
    pub platform: Platform,
}

#[derive(Serialize, Deserialize)]
pub struct ChannelListResponse {
    pub channels: Vec<Channel>,
}

#[derive(Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

impl<'r> Responder<'r, 'static> for ErrorResponse {
    fn respond_to(self, _: &'r Request<'_>) -> response::Result<'static> {
        let json = serde_json::to_string(&self).unwrap();
        Response::build()
            .status(Status::InternalServerError)
            .header(ContentType::JSON)
            .sized_body(json.len(), Cursor::new(json))
            .ok()
    }
}
