//! # accessline-app
//!
//! Application layer — use-cases and **port definitions** (traits).
//!
//! ## Responsibilities
//! - Define **port traits** that adapters must implement (driven/outbound ports):
//!   - `SubscriberRepository` — persistence and scoped queries for subscribers
//!   - `ServiceRepository` — declared services and their dependency edges
//!   - `ServiceInstanceRepository` — provisioned instances, including `touch`
//!   - `ServiceInstanceLinkRepository` — instance-to-instance links
//!   - `AccessDeviceProbe` — asks an access manager whether an ONU exists
//!   - `EventPublisher` — announces persisted subscribers
//! - Define **driving/inbound ports** as use-case structs:
//!   - `SubscriberService` — persist-time validation, tag allocation, invalidation
//!   - `ProvisioningReconciler` — materializes one instance + link per subscriber
//!   - `CatalogService` — seeds the declared service graph
//! - Provide **in-process infrastructure** (event bus) that doesn't need IO
//!
//! ## Dependency rule
//! Depends on `accessline-domain` only (plus `tokio::sync` and `rand`).
//! Never imports adapter crates. Adapters depend on *this* crate, not the reverse.

pub mod event_bus;
pub mod ports;
pub mod services;

#[cfg(test)]
pub(crate) mod testing;
