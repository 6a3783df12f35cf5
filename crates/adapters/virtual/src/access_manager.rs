//! Virtual access manager — an in-memory ONU inventory.

use std::collections::HashSet;
use std::future::Future;
use std::sync::{Arc, PoisonError, RwLock};

use accessline_app::ports::AccessDeviceProbe;
use accessline_domain::error::AccessLineError;
use accessline_domain::service::Service;

/// ONU devices known to [`VirtualAccessManager::default`].
pub const DEMO_DEVICES: [&str; 2] = ["BRCM1234", "BRCM5678"];

/// A simulated access-management controller.
///
/// Every provider service is answered from the same inventory. Clones share
/// the inventory, so a device registered through one handle is visible to all.
#[derive(Clone)]
pub struct VirtualAccessManager {
    devices: Arc<RwLock<HashSet<String>>>,
}

impl Default for VirtualAccessManager {
    fn default() -> Self {
        Self::with_devices(DEMO_DEVICES)
    }
}

impl VirtualAccessManager {
    /// A manager knowing exactly `devices`.
    pub fn with_devices<I, S>(devices: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            devices: Arc::new(RwLock::new(devices.into_iter().map(Into::into).collect())),
        }
    }

    /// Add an ONU device to the inventory. Returns `false` if it was already known.
    pub fn register(&self, onu_device: impl Into<String>) -> bool {
        self.devices
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(onu_device.into())
    }

    #[must_use]
    pub fn knows(&self, onu_device: &str) -> bool {
        self.devices
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(onu_device)
    }

    #[must_use]
    pub fn device_count(&self) -> usize {
        self.devices
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

impl AccessDeviceProbe for VirtualAccessManager {
    fn has_access_device(
        &self,
        _provider: &Service,
        onu_device: &str,
    ) -> impl Future<Output = Result<bool, AccessLineError>> + Send {
        let known = self.knows(onu_device);
        async move { Ok(known) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use accessline_domain::service::ACCESS_LINE_CONTROLLER;

    fn olt() -> Service {
        Service::new("olt", ACCESS_LINE_CONTROLLER)
    }

    #[tokio::test]
    async fn should_know_demo_devices_by_default() {
        let manager = VirtualAccessManager::default();

        assert_eq!(manager.device_count(), 2);
        for onu in DEMO_DEVICES {
            assert!(manager.has_access_device(&olt(), onu).await.unwrap());
        }
    }

    #[tokio::test]
    async fn should_not_know_unlisted_device() {
        let manager = VirtualAccessManager::with_devices(["BRCM1234"]);

        assert!(!manager.has_access_device(&olt(), "BRCM9999").await.unwrap());
    }

    #[tokio::test]
    async fn should_share_registered_devices_between_clones() {
        let manager = VirtualAccessManager::with_devices(Vec::<String>::new());
        let handle = manager.clone();

        assert!(handle.register("BRCM9999"));
        assert!(!handle.register("BRCM9999"));

        assert!(manager.has_access_device(&olt(), "BRCM9999").await.unwrap());
    }

    #[test]
    fn should_match_device_names_exactly() {
        let manager = VirtualAccessManager::with_devices(["BRCM1234"]);
        assert!(!manager.knows("brcm1234"));
        assert!(!manager.knows(""));
    }
}
