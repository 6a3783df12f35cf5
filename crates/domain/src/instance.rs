//! Service instances and the links between them.

use serde::{Deserialize, Serialize};

use crate::id::{InstanceId, LinkId, ServiceId};
use crate::time::{Timestamp, now};

/// One provisioned unit of a provider service (e.g. an access-line controller
/// instance serving a single subscriber).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceInstance {
    pub id: InstanceId,
    pub name: String,
    pub owner: ServiceId,
    pub capability: String,
    pub created: Timestamp,
    /// Touched to mark the instance dirty for the synchronizer.
    pub updated: Timestamp,
}

impl ServiceInstance {
    /// Create a new instance owned by `owner`, with a fresh id.
    #[must_use]
    pub fn new(name: impl Into<String>, owner: ServiceId, capability: impl Into<String>) -> Self {
        let ts = now();
        Self {
            id: InstanceId::new(),
            name: name.into(),
            owner,
            capability: capability.into(),
            created: ts,
            updated: ts,
        }
    }
}

/// Directed edge between two instances: the subscriber side consumes the
/// provider side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceInstanceLink {
    pub id: LinkId,
    pub subscriber_service_instance: InstanceId,
    pub provider_service_instance: InstanceId,
    pub created: Timestamp,
}

impl ServiceInstanceLink {
    #[must_use]
    pub fn new(subscriber: InstanceId, provider: InstanceId) -> Self {
        Self {
            id: LinkId::new(),
            subscriber_service_instance: subscriber,
            provider_service_instance: provider,
            created: now(),
        }
    }
}
