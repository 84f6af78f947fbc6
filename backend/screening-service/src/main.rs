/// Screening Service - HTTP Server
///
/// Serves the GraphQL API for invites and candidate videos, plus the
/// multipart upload endpoint.
use actix_web::{web, App, HttpServer};
use anyhow::Context;
use screening_service::db::build_repository;
use screening_service::schema::build_schema;
use screening_service::services::build_storage;
use screening_service::{handlers, middleware, AppState, Config};
use tracing::info;
use tracing_actix_web::TracingLogger;
use tracing_subscriber::prelude::*;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,screening_service=debug".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(true)
                .with_span_list(true)
                .with_thread_ids(true)
                .with_line_number(true)
                .with_file(true)
                .with_target(true),
        )
        .init();

    let config = Config::from_env().context("Failed to load configuration")?;
    info!(
        env = %config.app.env,
        repo_backend = ?config.repo.backend,
        upload_dir = %config.storage.upload_dir.display(),
        "Configuration loaded"
    );

    let repo = build_repository(&config.repo)
        .await
        .context("Failed to initialize record store")?;
    let storage = build_storage(&config.storage).context("Failed to initialize blob storage")?;

    let state = AppState::new(repo.clone(), storage)
        .with_max_upload_bytes(config.storage.max_upload_bytes);
    let schema = build_schema(repo);

    let bind_addr = format!("{}:{}", config.app.host, config.app.port);
    info!("Screening Service starting on http://{}", bind_addr);

    let cors_config = config.cors.clone();
    let playground = config.graphql.playground;

    HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(state.clone()))
            .app_data(web::Data::new(schema.clone()))
            .wrap(middleware::cors(&cors_config))
            .wrap(TracingLogger::default())
            .configure(handlers::routes(playground))
    })
    .bind(&bind_addr)?
    .run()
    .await?;

    info!("Screening Service shutting down");
    Ok(())
}
