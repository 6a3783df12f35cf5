//! Application services — use-case implementations.
//!
//! Each service struct accepts port trait implementations via generic parameters
//! (constructor injection), keeping this layer decoupled from concrete adapters.

pub mod catalog_service;
pub mod instance_registry;
pub mod invalidation;
pub mod provisioning;
pub mod subscriber_service;
pub mod tag_allocator;
