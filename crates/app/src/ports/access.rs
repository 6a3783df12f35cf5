//! Access-management port — confirms that a physical access device exists.
//!
//! Only consulted for owners whose access network is
//! [`DeviceManaged`](accessline_domain::service::AccessMode::DeviceManaged).

use std::future::Future;

use accessline_domain::error::AccessLineError;
use accessline_domain::service::Service;

/// Asks the access-management service whether it knows an ONU device.
pub trait AccessDeviceProbe {
    /// Whether `provider` (the access-management service) manages `onu_device`.
    fn has_access_device(
        &self,
        provider: &Service,
        onu_device: &str,
    ) -> impl Future<Output = Result<bool, AccessLineError>> + Send;
}
