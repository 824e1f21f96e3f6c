//! JSON API server for the battle tournament engine.
//! Run with: cargo run --bin web
//! Listens on 0.0.0.0:8080 by default. Override with env: HOST, PORT; log level with RUST_LOG.

use actix_web::{middleware::Logger, web::Data, App, HttpServer};
use battle_tournament::{api, Engine, ServerConfig};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let config = ServerConfig::from_env();
    let (host, port) = config.bind_address();
    log::info!("Starting server at http://{}:{}", host, port);

    let engine = Data::new(Engine::new());

    HttpServer::new(move || {
        App::new()
            .app_data(engine.clone())
            .wrap(Logger::default())
            .configure(api::configure)
    })
    .bind((host, port))?
    .run()
    .await
}
