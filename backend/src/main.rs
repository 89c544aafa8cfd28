#[macro_use]
extern crate rocket;

mod api;
mod config;
mod models;
mod services;
mod utils;

use elasticsearch::Elasticsearch;
use services::stream_cache::StreamCache;

pub struct AppState {
    pub es_client: Elasticsearch,
    pub cache: StreamCache,
}

#[launch]
async fn rocket() -> _ {
    config::load_environment();
    config::init_logger();

    let state = config::create_app_state()
        .await
        .expect("Failed to initialize application state");
    let cors = config::create_cors().expect("Failed to create CORS configuration");

    rocket::build()
        .manage(state)
        .attach(cors)
        .mount(
            "/channels",
            routes![
                api::channels::add_channel,
                api::channels::get_channels,
                api::channels::remove_channel
            ],
        )
        .mount("/schedule", routes![api::schedule::get_schedule])
}
