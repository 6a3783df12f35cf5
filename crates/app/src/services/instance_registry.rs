//! Instance registry — maps a provider capability to the factory that builds
//! its per-subscriber instance.

use std::collections::HashMap;

use accessline_domain::instance::ServiceInstance;
use accessline_domain::service::{ACCESS_LINE_CONTROLLER, Service};
use accessline_domain::subscriber::Subscriber;

/// Builds the provider instance that will serve `subscriber`.
pub type InstanceFactory = fn(&Service, &Subscriber) -> ServiceInstance;

/// Explicit capability-to-factory table.
#[derive(Debug, Clone, Default)]
pub struct InstanceRegistry {
    factories: HashMap<String, InstanceFactory>,
}

impl InstanceRegistry {
    /// An empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry knowing the access-line controller factory.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::new().register(ACCESS_LINE_CONTROLLER, access_line_controller)
    }

    /// Register (or replace) the factory for `capability`.
    #[must_use]
    pub fn register(mut self, capability: impl Into<String>, factory: InstanceFactory) -> Self {
        self.factories.insert(capability.into(), factory);
        self
    }

    #[must_use]
    pub fn get(&self, capability: &str) -> Option<InstanceFactory> {
        self.factories.get(capability).copied()
    }
}

/// One controller instance per subscriber, named after both sides.
fn access_line_controller(provider: &Service, subscriber: &Subscriber) -> ServiceInstance {
    ServiceInstance::new(
        format!("{}-for-{}", provider.name, subscriber.id),
        provider.id,
        ACCESS_LINE_CONTROLLER,
    )
}
