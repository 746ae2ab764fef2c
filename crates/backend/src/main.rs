#![allow(clippy::too_many_arguments, clippy::type_complexity)]

pub mod dashboards;
pub mod domain;
pub mod handlers;
pub mod routes;
pub mod shared;
pub mod system;
pub mod usecases;

use axum::http::{header, HeaderValue, Method};
use axum::middleware;
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tower_http::cors::{AllowOrigin, CorsLayer};

use crate::domain::a007_station_catalog::service as station_catalog;
use crate::shared::station_api::StationApiClient;

fn cors_layer(origins: &[String]) -> CorsLayer {
    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();
    if allowed.is_empty() {
        tracing::warn!("No CORS origins configured, cross-origin requests will be rejected");
    }

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed))
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
}

/// Station and register names are cosmetic; a failure only leaves the maps empty
async fn load_station_catalog() {
    let result = match StationApiClient::from_config() {
        Ok(client) => station_catalog::reload(&client).await.map(|_| ()),
        Err(e) => Err(e),
    };
    if let Err(e) = result {
        tracing::warn!("Station catalog not loaded: {:#}", e);
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    system::tracing::initialize()?;

    let config = shared::config::init(shared::config::load_config()?)?;

    shared::data::db::initialize_database(&config.database).await?;

    shared::data::migration_runner::run_migrations().await?;

    system::initialization::ensure_admin_user_exists().await?;

    load_station_catalog().await;

    if config.scheduler.enabled {
        let worker =
            system::tasks::initialization::initialize_scheduled_tasks(config.scheduler.interval_seconds)
                .await?;
        tokio::spawn(async move { worker.run_loop().await });
        tracing::info!(
            "Scheduler started, checking every {}s",
            config.scheduler.interval_seconds
        );
    } else {
        tracing::info!("Scheduler disabled by configuration");
    }

    let app = routes::configure_routes()
        .layer(middleware::from_fn(
            system::middleware::request_logger::request_logger,
        ))
        .layer(cors_layer(&config.server.cors_origins));

    let addr: SocketAddr = ([0, 0, 0, 0], config.server.port).into();

    tracing::info!("Attempting to bind server to http://{}", addr);
    let listener = match TcpListener::bind(addr).await {
        Ok(listener) => {
            tracing::info!("Server successfully bound to {}", addr);
            listener
        }
        Err(e) => {
            if e.kind() == std::io::ErrorKind::AddrInUse {
                tracing::error!(
                    "Port {} is already in use. Please ensure no other process is using this port.",
                    config.server.port
                );
            } else {
                tracing::error!("Failed to bind to port {}. Error: {}", config.server.port, e);
            }
            return Err(e.into());
        }
    };

    axum::serve(listener, app).await?;

    Ok(())
}
