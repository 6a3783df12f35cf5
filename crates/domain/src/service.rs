//! Service — a declared business capability and its place in the service graph.
//!
//! Services form a directed graph through [`ServiceDependency`] edges: the
//! subscriber side depends on the provider side. Each service declares the
//! `capability` of the instances it materializes, which the reconciler uses
//! to pick a provider and the instance registry uses to pick a factory.

use serde::{Deserialize, Serialize};

use crate::error::{AccessLineError, ValidationError};
use crate::id::{DependencyId, ServiceId};

/// Capability of the service that owns subscribers.
pub const SUBSCRIBER_CAPABILITY: &str = "subscriber";

/// Capability of the per-line access controller (the OLT side of a subscriber).
pub const ACCESS_LINE_CONTROLLER: &str = "access-line-controller";

/// How the physical access network behind a service is managed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AccessMode {
    #[default]
    Unmanaged,
    /// Access devices are managed by a controller that can confirm an ONU exists.
    DeviceManaged,
}

impl AccessMode {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Unmanaged => "unmanaged",
            Self::DeviceManaged => "device-managed",
        }
    }
}

/// Returned when parsing an unknown access mode string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown access mode: {0}")]
pub struct UnknownAccessMode(pub String);

impl std::str::FromStr for AccessMode {
    type Err = UnknownAccessMode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "unmanaged" => Ok(Self::Unmanaged),
            "device-managed" => Ok(Self::DeviceManaged),
            other => Err(UnknownAccessMode(other.to_string())),
        }
    }
}

/// A declared service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Service {
    pub id: ServiceId,
    pub name: String,
    pub capability: String,
    pub access: AccessMode,
}

impl Service {
    /// Create a new service with a fresh id.
    #[must_use]
    pub fn new(name: impl Into<String>, capability: impl Into<String>) -> Self {
        Self {
            id: ServiceId::new(),
            name: name.into(),
            capability: capability.into(),
            access: AccessMode::default(),
        }
    }

    #[must_use]
    pub fn with_access(mut self, access: AccessMode) -> Self {
        self.access = access;
        self
    }

    /// Check domain invariants.
    ///
    /// # Errors
    ///
    /// Returns [`AccessLineError::Validation`] when `name` is empty.
    pub fn validate(&self) -> Result<(), AccessLineError> {
        if self.name.is_empty() {
            return Err(ValidationError::EmptyName.into());
        }
        Ok(())
    }

    /// Whether this service materializes instances of `capability`.
    #[must_use]
    pub fn provides(&self, capability: &str) -> bool {
        self.capability == capability
    }
}

/// Directed edge: `subscriber_service` depends on `provider_service`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceDependency {
    pub id: DependencyId,
    pub subscriber_service: ServiceId,
    pub provider_service: ServiceId,
}

impl ServiceDependency {
    #[must_use]
    pub fn new(subscriber_service: ServiceId, provider_service: ServiceId) -> Self {
        Self {
            id: DependencyId::new(),
            subscriber_service,
            provider_service,
        }
    }
}
