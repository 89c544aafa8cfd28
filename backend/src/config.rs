use crate::models::UserToken;
use crate::services::elasticsearch_service::create_es_index;
use crate::services::stream_cache::StreamCache;
use crate::AppState;
use anyhow::Result;
use elasticsearch::{
    http::transport::{SingleNodeConnectionPool, TransportBuilder},
    Elasticsearch,
};
use env_logger::Builder;
use lazy_static::lazy_static;
use log::{info, LevelFilter};
use rocket::http::{Method, Status};
use rocket::request::{FromRequest, Outcome};
use rocket::Request;
use rocket_cors::{AllowedHeaders, AllowedOrigins, CorsOptions};
use std::env;
use std::time::Duration;

lazy_static! {
    pub static ref ELASTICSEARCH_URL: String =
        env::var("ELASTICSEARCH_URL").unwrap_or_else(|_| "http://localhost:9200".to_string());
    pub static ref STREAM_CACHE_TTL_SECS: u64 = env::var("STREAM_CACHE_TTL_SECS")
        .unwrap_or_else(|_| "300".to_string())
        .parse::<u64>()
        .unwrap_or(300);
}

/// Upstream credentials, read per request instead of at startup so a
/// missing secret surfaces as one descriptive error on the affected
/// request rather than a panic. Operations touching only one platform
/// demand only that platform's secrets.
#[derive(Debug, Clone, Default)]
pub struct ApiCredentials {
    pub youtube_api_key: Option<String>,
    pub twitch_client_id: Option<String>,
    pub twitch_client_secret: Option<String>,
}

impl ApiCredentials {
    pub fn from_env() -> Self {
        ApiCredentials {
            youtube_api_key: env::var("YOUTUBE_API_KEY").ok(),
            twitch_client_id: env::var("TWITCH_CLIENT_ID").ok(),
            twitch_client_secret: env::var("TWITCH_CLIENT_SECRET").ok(),
        }
    }

    pub fn youtube_api_key(&self) -> Result<&str> {
        self.youtube_api_key
            .as_deref()
            .ok_or_else(|| anyhow::anyhow!("YOUTUBE_API_KEY environment variable is not set"))
    }

    pub fn twitch(&self) -> Result<(&str, &str)> {
        let client_id = self
            .twitch_client_id
            .as_deref()
            .ok_or_else(|| anyhow::anyhow!("TWITCH_CLIENT_ID environment variable is not set"))?;
        let client_secret = self.twitch_client_secret.as_deref().ok_or_else(|| {
            anyhow::anyhow!("TWITCH_CLIENT_SECRET environment variable is not set")
        })?;
        Ok((client_id, client_secret))
    }
}

pub fn init_logger() {
    Builder::new().filter_level(LevelFilter::Info).init();
    info!("Starting Rocket backend...");
}

pub fn load_environment() {
    dotenv::dotenv().ok();
}

pub fn create_elasticsearch_client() -> Result<Elasticsearch> {
    let es_url = &*ELASTICSEARCH_URL;
    info!("Connecting to Elasticsearch at: {es_url}");

    let transport =
        TransportBuilder::new(SingleNodeConnectionPool::new(es_url.parse()?)).build()?;

    Ok(Elasticsearch::new(transport))
}

pub async fn create_app_state() -> Result<AppState> {
    let es_client = create_elasticsearch_client()?;

    create_es_index(&es_client).await;

    Ok(AppState {
        es_client,
        cache: StreamCache::new(Duration::from_secs(*STREAM_CACHE_TTL_SECS)),
    })
}

pub fn create_cors() -> Result<rocket_cors::Cors> {
    let cors = CorsOptions::default()
        .allowed_origins(AllowedOrigins::some_exact(&["http://localhost:8080"]))
        .allowed_methods(
            vec![
                Method::Get,
                Method::Post,
                Method::Put,
                Method::Delete,
                Method::Options,
            ]
            .into_iter()
            .map(From::from)
            .collect(),
        )
        .allowed_headers(AllowedHeaders::some(&[
            "Authorization",
            "Accept",
            "Content-Type",
        ]))
        .allow_credentials(true)
        .to_cors()
        .map_err(|e| anyhow::anyhow!("Failed to create CORS options: {}", e))?;

    Ok(cors)
}

#[rocket::async_trait]
impl<'r> FromRequest<'r> for UserToken {
    type Error = &'static str;

    async fn from_request(request: &'r Request<'_>) -> Outcome<Self, Self::Error> {
        let token = request
            .headers()
            .get_one("Authorization")
            .and_then(|auth| auth.strip_prefix("Bearer "));

        match token {
            Some(t) if !t.is_empty() => Outcome::Success(UserToken(t.to_string())),
            _ => Outcome::Error((Status::Unauthorized, "Missing bearer token")),
        }
    }
}
