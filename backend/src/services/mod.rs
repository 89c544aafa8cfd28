pub mod channel_service;
pub mod elasticsearch_service;
pub mod schedule_service;
pub mod stream_cache;
pub mod twitch_service;
pub mod youtube_service;
