use actix_web::middleware::NormalizePath;
use actix_web::web::Data;
use actix_web::{App, HttpServer, Responder, get};
use std::sync::Arc;

mod api;
mod auth;
mod config;
mod docs;
mod error;
mod model;
mod models;
mod routes;
mod store;
mod sync;
mod utils;

use crate::auth::{handlers::seed_admin, sessions::SessionStore};
use crate::docs::ApiDoc;
use crate::store::Store;
use crate::sync::{DailySchedule, Reconciler, scheduler::spawn_daily};
use anyhow::Context;
use config::Config;
use tracing::info;
use tracing_appender::rolling;
use utoipa::OpenApi; // ← needed for ApiDoc::openapi()
use utoipa_swagger_ui::SwaggerUi;

#[get("/")]
async fn index() -> impl Responder {
    "Vendor Management System"
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;

    // Rolling daily log
    let file_appender = rolling::daily(&config.log_dir, "app.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_max_level(tracing::Level::DEBUG)
        .with_ansi(false)
        .with_target(false) // removes module path
        .with_level(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .pretty()
        .init();

    info!("Server starting...");

    let store = Arc::new(Store::new());
    seed_admin(&store, &config)?;

    let sessions = Data::new(SessionStore::new(config.refresh_token_ttl as u64));
    let reconciler = Arc::new(Reconciler::from_entropy(store.clone(), store.clone()));

    let schedule = DailySchedule::at_hour(config.attendance_sync_hour)
        .context("ATTENDANCE_SYNC_HOUR out of range")?;
    spawn_daily(reconciler.clone(), schedule);

    let server_addr = config.server_addr.clone();
    let store = Data::from(store);
    let reconciler = Data::from(reconciler);

    HttpServer::new(move || {
        App::new()
            .wrap(actix_web::middleware::Logger::default())
            .wrap(NormalizePath::trim())
            .wrap(routes::build_cors(&config))
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}") // ← important: wildcard {_:.*} to match JS/CSS files
                    .url("/api-doc/openapi.json", ApiDoc::openapi()),
            )
            .app_data(Data::new(config.clone()))
            .app_data(store.clone())
            .app_data(sessions.clone())
            .app_data(reconciler.clone())
            .service(index)
            // auth + protected routes with rate limiting
            .configure(|cfg| routes::configure(cfg, config.clone()))
    })
    .bind(&server_addr)
    .with_context(|| format!("failed to bind {server_addr}"))?
    .run()
    .await?;

    Ok(())
}
