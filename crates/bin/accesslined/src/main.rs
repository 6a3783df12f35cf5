//! # accesslined — access-line provisioning daemon
//!
//! Composition root that wires all adapters together and starts the server.
//!
//! ## Responsibilities
//! - Parse configuration (env vars, config file)
//! - Initialize the `SQLite` connection pool and run migrations
//! - Seed the declared service catalog
//! - Construct repository implementations (adapters)
//! - Construct application services, injecting repositories via port traits
//! - Spawn the provisioning worker on the in-process event bus
//! - Build the axum router, injecting application services
//! - Bind to a TCP port and serve until SIGINT
//!
//! ## Dependency rule
//! This is the **only** crate that depends on all other crates.
//! It is the wiring layer. No domain logic belongs here.

mod config;

use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use accessline_adapter_http_axum::state::AppState;
use accessline_adapter_storage_sqlite_sqlx::{
    Config as DatabaseConfig, SqliteServiceInstanceLinkRepository,
    SqliteServiceInstanceRepository, SqliteServiceRepository, SqliteSubscriberRepository,
};
use accessline_adapter_virtual::VirtualAccessManager;
use accessline_app::event_bus::InProcessEventBus;
use accessline_app::services::catalog_service::CatalogService;
use accessline_app::services::instance_registry::InstanceRegistry;
use accessline_app::services::invalidation::InvalidationPropagator;
use accessline_app::services::provisioning::{ProvisioningReconciler, run_provisioning_worker};
use accessline_app::services::subscriber_service::SubscriberService;
use accessline_app::services::tag_allocator::TagAllocator;

use crate::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::load().context("loading configuration")?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&config.logging.filter))
        .init();

    // Database
    let db = DatabaseConfig {
        database_url: config.database_url().to_string(),
    }
    .build()
    .await
    .context("opening database")?;
    let pool = db.pool().clone();

    // Repositories
    let subscriber_repo = SqliteSubscriberRepository::new(pool.clone());
    let service_repo = SqliteServiceRepository::new(pool.clone());
    let instance_repo = SqliteServiceInstanceRepository::new(pool.clone());
    let link_repo = SqliteServiceInstanceLinkRepository::new(pool);

    // Catalog
    let catalog_service = CatalogService::new(service_repo.clone());
    catalog_service
        .declare(&config.catalog.declarations())
        .await
        .context("declaring service catalog")?;

    // Event bus
    let event_bus = Arc::new(InProcessEventBus::new(256));

    // Access manager
    let access_manager = if config.access.devices.is_empty() {
        VirtualAccessManager::default()
    } else {
        VirtualAccessManager::with_devices(config.access.devices.iter().cloned())
    };

    // Services
    let subscriber_service = SubscriberService::new(
        subscriber_repo,
        service_repo.clone(),
        access_manager,
        Arc::clone(&event_bus),
        InvalidationPropagator::new(link_repo.clone(), instance_repo.clone()),
        TagAllocator::new(config.allocation.max_attempts),
    );

    // Provisioning
    let reconciler = ProvisioningReconciler::new(
        service_repo,
        instance_repo,
        link_repo,
        InstanceRegistry::with_defaults(),
    )
    .with_target_capability(config.provisioning.target_capability.clone());
    let events = event_bus.subscribe();
    let worker = tokio::spawn(async move {
        run_provisioning_worker(&reconciler, events).await;
    });

    // HTTP
    let state = AppState::new(subscriber_service, catalog_service);
    let app = accessline_adapter_http_axum::router::build(state);

    let bind_addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("binding {bind_addr}"))?;
    tracing::info!(address = %bind_addr, "accesslined listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // The router held the last publisher; the worker drains and stops.
    drop(event_bus);
    if let Err(err) = worker.await {
        tracing::warn!(error = %err, "provisioning worker panicked");
    }
    tracing::info!("accesslined stopped");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown signal received");
}
