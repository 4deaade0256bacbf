use std::sync::Arc;

use divelog_app::app::api::routes;
use divelog_app::config::ConfigHandler;
use divelog_app::services_handler::DiveServicesHandler;
use divelog_core::clock::SystemClock;
use divelog_core::config::load_config;
use divelog_db::db::connection::{create_pool, run_migrations};
use divelog_db::store::PgDiveStore;
use divelog_service::services::DiveServices;
use salvo::conn::TcpListener;
use salvo::{Listener, Router};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, reload, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let (filter_layer, filter_handle) = reload::Layer::new(EnvFilter::new("debug"));

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(
            fmt::layer()
                .with_target(true)
                .with_thread_ids(true)
                .with_file(true)
                .with_line_number(true),
        )
        .init();

    tracing::info!("Starting dive log server");

    let config = load_config()?;

    tracing::info!(
        bind_addr = %config.server.bind_addr(),
        photo_backend = ?config.photos.backend,
        geocode_cache = config.geocoder.cache_ttl().is_some(),
        "Configuration loaded"
    );

    if let Ok(filter) = EnvFilter::try_new(config.logging.level.as_str()) {
        if let Err(e) = filter_handle.modify(|current| *current = filter) {
            tracing::warn!(error = %e, "Failed to update log filter from config");
        }
    } else {
        tracing::warn!(level = %config.logging.level, "Invalid log level in config, keeping debug");
    }

    if config.database.run_migrations {
        run_migrations(&config.database.url).await?;
    }

    let pool = create_pool(
        &config.database.url,
        u32::from(config.database.max_connections),
    )
    .await?;

    tracing::info!("Database connection pool created.");

    let services = DiveServices::from_settings(
        &config,
        Arc::new(PgDiveStore::new(pool)),
        Arc::new(SystemClock),
    )?;

    let bind_addr = config.server.bind_addr();
    let acceptor = TcpListener::new(bind_addr.clone()).bind().await;

    let router = Router::new()
        .hoop(ConfigHandler::new(config))
        .hoop(DiveServicesHandler {
            services: Arc::new(services),
        })
        .push(routes());

    tracing::info!("Server listening on {bind_addr}");

    salvo::Server::new(acceptor).serve(router).await;

    Ok(())
}
