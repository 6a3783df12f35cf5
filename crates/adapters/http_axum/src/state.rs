//! Shared application state for axum handlers.

use std::sync::Arc;

use accessline_app::ports::{
    AccessDeviceProbe, EventPublisher, ServiceInstanceLinkRepository, ServiceInstanceRepository,
    ServiceRepository, SubscriberRepository,
};
use accessline_app::services::catalog_service::CatalogService;
use accessline_app::services::subscriber_service::SubscriberService;

/// Application state shared across all axum handlers.
///
/// Generic over the repository types, access probe and event publisher to
/// avoid dynamic dispatch. `Clone` is implemented manually so the underlying
/// types themselves do not need to be `Clone`; only the `Arc` wrappers are
/// cloned.
pub struct AppState<SR, SVR, LR, IR, AP, EP> {
    /// Subscriber lifecycle service.
    pub subscriber_service: Arc<SubscriberService<SR, SVR, LR, IR, AP, EP>>,
    /// Service catalog queries.
    pub catalog_service: Arc<CatalogService<SVR>>,
}

impl<SR, SVR, LR, IR, AP, EP> Clone for AppState<SR, SVR, LR, IR, AP, EP> {
    fn clone(&self) -> Self {
        Self {
            subscriber_service: Arc::clone(&self.subscriber_service),
            catalog_service: Arc::clone(&self.catalog_service),
        }
    }
}

impl<SR, SVR, LR, IR, AP, EP> AppState<SR, SVR, LR, IR, AP, EP>
where
    SR: SubscriberRepository + Send + Sync + 'static,
    SVR: ServiceRepository + Send + Sync + 'static,
    LR: ServiceInstanceLinkRepository + Send + Sync + 'static,
    IR: ServiceInstanceRepository + Send + Sync + 'static,
    AP: AccessDeviceProbe + Send + Sync + 'static,
    EP: EventPublisher + Send + Sync + 'static,
{
    /// Create a new application state from service instances.
    pub fn new(
        subscriber_service: SubscriberService<SR, SVR, LR, IR, AP, EP>,
        catalog_service: CatalogService<SVR>,
    ) -> Self {
        Self::from_arcs(Arc::new(subscriber_service), Arc::new(catalog_service))
    }

    /// Create a new application state from pre-wrapped `Arc` services.
    ///
    /// Use this when services need to be shared with background tasks
    /// before constructing the HTTP state.
    pub fn from_arcs(
        subscriber_service: Arc<SubscriberService<SR, SVR, LR, IR, AP, EP>>,
        catalog_service: Arc<CatalogService<SVR>>,
    ) -> Self {
        Self {
            subscriber_service,
            catalog_service,
        }
    }
}
