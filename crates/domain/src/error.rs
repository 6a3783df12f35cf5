//! Common error types used across the workspace.
//!
//! Each layer defines its own typed errors and converts into
//! [`AccessLineError`] via `#[from]`. Adapter failures are boxed into
//! [`AccessLineError::Storage`].

/// Top-level error returned by domain logic, application services and ports.
#[derive(Debug, thiserror::Error)]
pub enum AccessLineError {
    /// User-facing validation failure. Never retried.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// A caller broke the contract of an operation.
    #[error(transparent)]
    Programming(#[from] ProgrammingError),

    #[error(transparent)]
    NotFound(#[from] NotFoundError),

    /// The tag space of a scope could not yield a free value.
    #[error(transparent)]
    Allocation(#[from] AllocationError),

    /// The declared service graph cannot satisfy a request.
    #[error(transparent)]
    Dependency(#[from] DependencyError),

    #[error("storage error")]
    Storage(Box<dyn std::error::Error + Send + Sync>),
}

/// Field-level and cross-record invariant violations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("name must not be empty")]
    EmptyName,

    #[error("invalid identifier: {0}")]
    InvalidId(String),

    #[error("onu_device must not be empty")]
    EmptyOnuDevice,

    #[error("subscriber must name an owning service")]
    MissingOwner,

    #[error("the MAC address specified is not valid: {0}")]
    InvalidMacAddress(String),

    #[error("the {tag} you specified ({value}) is outside the range {min}..={max}")]
    TagOutOfRange {
        tag: &'static str,
        value: u16,
        min: u16,
        max: u16,
    },

    #[error("the c_tag you specified ({c_tag}) has already been used on device {onu_device}")]
    CTagInUse { c_tag: u16, onu_device: String },

    #[error(
        "the c_tag ({c_tag}) and s_tag ({s_tag}) pair you specified has already been used by subscriber {subscriber_id}"
    )]
    TagPairInUse {
        c_tag: u16,
        s_tag: u16,
        subscriber_id: String,
    },

    #[error("the service_specific_id you specified ({0}) has already been used")]
    DuplicateServiceSpecificId(String),

    #[error("the onu_device you specified ({0}) does not exist")]
    AccessDeviceNotFound(String),

    /// The store rejected the write because a concurrent persist took the same tags.
    #[error("the c_tag/s_tag assignment conflicts with a concurrent write")]
    TagConflict,
}

/// Contract violations by the caller of an operation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProgrammingError {
    #[error("subscriber caller was not set")]
    MissingCaller,
}

/// A record looked up by id does not exist.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{entity} not found: {id}")]
pub struct NotFoundError {
    pub entity: &'static str,
    pub id: String,
}

/// Retry budget exhausted while drawing a tag.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AllocationError {
    #[error("no free {tag} found after {attempts} attempts")]
    Exhausted { tag: &'static str, attempts: u32 },
}

/// Service graph could not be resolved into exactly one target.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DependencyError {
    #[error("service {service} has no provider with capability {capability}")]
    NoProvider { service: String, capability: String },

    #[error("service {service} has {count} providers with capability {capability}")]
    AmbiguousProvider {
        service: String,
        capability: String,
        count: usize,
    },

    #[error("no instance factory registered for capability {0}")]
    UnregisteredCapability(String),

    #[error("service {0} manages access devices but has no provider service")]
    NoAccessManager(String),
}
