//! Subscriber status — the operational state of an access line.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Operational state of a subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SubscriberStatus {
    Enabled,
    Disabled,
    Suspended,
    /// Declared ahead of the physical line; provisioning and the access
    /// device check are deferred until the status changes.
    #[default]
    PreProvisioned,
    AwaitingAuth,
    AuthFailed,
}

impl SubscriberStatus {
    /// Whether the subscriber is still waiting to be provisioned.
    #[must_use]
    pub fn is_pre_provisioned(self) -> bool {
        matches!(self, Self::PreProvisioned)
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Enabled => "enabled",
            Self::Disabled => "disabled",
            Self::Suspended => "suspended",
            Self::PreProvisioned => "pre-provisioned",
            Self::AwaitingAuth => "awaiting-auth",
            Self::AuthFailed => "auth-failed",
        }
    }
}

impl std::fmt::Display for SubscriberStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when parsing an unknown status string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown subscriber status: {0}")]
pub struct UnknownStatus(pub String);

impl FromStr for SubscriberStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "enabled" => Ok(Self::Enabled),
            "disabled" => Ok(Self::Disabled),
            "suspended" => Ok(Self::Suspended),
            "pre-provisioned" => Ok(Self::PreProvisioned),
            "awaiting-auth" => Ok(Self::AwaitingAuth),
            "auth-failed" => Ok(Self::AuthFailed),
            other => Err(UnknownStatus(other.to_string())),
        }
    }
}
