//! JSON REST API handler modules.

#[allow(clippy::missing_errors_doc)]
pub mod services;
#[allow(clippy::missing_errors_doc)]
pub mod subscribers;

use axum::Router;
use axum::http::HeaderMap;
use axum::routing::get;

use accessline_app::ports::{
    AccessDeviceProbe, EventPublisher, ServiceInstanceLinkRepository, ServiceInstanceRepository,
    ServiceRepository, SubscriberRepository,
};

use crate::state::AppState;

/// Header naming the principal performing the request.
pub const CALLER_HEADER: &str = "x-caller";

/// Build the `/api` sub-router.
pub fn routes<SR, SVR, LR, IR, AP, EP>() -> Router<AppState<SR, SVR, LR, IR, AP, EP>>
where
    SR: SubscriberRepository + Send + Sync + 'static,
    SVR: ServiceRepository + Send + Sync + 'static,
    LR: ServiceInstanceLinkRepository + Send + Sync + 'static,
    IR: ServiceInstanceRepository + Send + Sync + 'static,
    AP: AccessDeviceProbe + Send + Sync + 'static,
    EP: EventPublisher + Send + Sync + 'static,
{
    Router::new()
        // Subscribers
        .route(
            "/subscribers",
            get(subscribers::list::<SR, SVR, LR, IR, AP, EP>)
                .post(subscribers::create::<SR, SVR, LR, IR, AP, EP>),
        )
        .route(
            "/subscribers/{id}",
            get(subscribers::get::<SR, SVR, LR, IR, AP, EP>)
                .put(subscribers::update::<SR, SVR, LR, IR, AP, EP>)
                .delete(subscribers::delete::<SR, SVR, LR, IR, AP, EP>),
        )
        // Services
        .route("/services", get(services::list::<SR, SVR, LR, IR, AP, EP>))
}

/// The value of the [`CALLER_HEADER`], when present and valid UTF-8.
fn caller(headers: &HeaderMap) -> Option<String> {
    headers
        .get(CALLER_HEADER)
        .and_then(|value| value.to_str().ok())
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}
