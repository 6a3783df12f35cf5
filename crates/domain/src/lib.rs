//! # accessline-domain
//!
//! Pure domain model for the accessline subscriber provisioning system.
//!
//! ## Responsibilities
//! - Foundational types: typed identifiers, error conventions, timestamps
//! - Define **Subscribers** (one access line: ONU device, C-tag/S-tag pair, MAC, status)
//! - Define **Services** and their declared **dependencies** (the service graph)
//! - Define **Service instances** and the **links** between them
//! - Define **Events** published after a subscriber is persisted
//! - Contain field-level invariant enforcement (MAC format, empty names, tag range)
//!
//! ## Dependency rule
//! This crate has **no internal dependencies**.
//! It must never import anything from `app`, adapters, or external IO crates.
//! All IO boundaries are expressed as traits in the `app` crate (ports).

pub mod error;
pub mod id;
pub mod time;

pub mod event;
pub mod instance;
pub mod service;
pub mod subscriber;
