//! # accessline-adapter-virtual
//!
//! Virtual access manager that stands in for a real access-network
//! controller during testing and demonstration.
//!
//! ## Provided devices
//!
//! | ONU device | Purpose |
//! |------------|---------|
//! | `BRCM1234` | Default demo ONU |
//! | `BRCM5678` | Second demo ONU on the same controller |
//!
//! Additional devices come from configuration or [`VirtualAccessManager::register`].
//!
//! ## Dependency rule
//!
//! Depends on `accessline-app` (port traits) and `accessline-domain` only.

mod access_manager;

pub use access_manager::{DEMO_DEVICES, VirtualAccessManager};
