//! Axum router assembly.

use axum::Router;
use axum::routing::get;
use tower_http::trace::TraceLayer;

use accessline_app::ports::{
    AccessDeviceProbe, EventPublisher, ServiceInstanceLinkRepository, ServiceInstanceRepository,
    ServiceRepository, SubscriberRepository,
};

use crate::state::AppState;

/// Build the top-level axum [`Router`].
///
/// Nests API routes under `/api`.
/// Includes a [`TraceLayer`] that logs each HTTP request/response at the
/// `DEBUG` level using the `tracing` ecosystem.
pub fn build<SR, SVR, LR, IR, AP, EP>(state: AppState<SR, SVR, LR, IR, AP, EP>) -> Router
where
    SR: SubscriberRepository + Send + Sync + 'static,
    SVR: ServiceRepository + Send + Sync + 'static,
    LR: ServiceInstanceLinkRepository + Send + Sync + 'static,
    IR: ServiceInstanceRepository + Send + Sync + 'static,
    AP: AccessDeviceProbe + Send + Sync + 'static,
    EP: EventPublisher + Send + Sync + 'static,
{
    Router::new()
        .route("/health", get(health_check))
        .nest("/api", crate::api::routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health_check() -> &'static str {
    "OK"
}
