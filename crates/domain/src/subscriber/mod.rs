//! Subscriber — the access-line identity being provisioned.
//!
//! A subscriber is bound to one physical access endpoint (`onu_device`) and
//! carries the two tags that identify its traffic: a C-tag, unique per ONU
//! device, and an S-tag, unique only in combination with the C-tag across
//! the whole system. Cross-record checks live in the application layer; this
//! module only enforces what can be decided from the record alone.

mod mac;
mod status;
mod tag;

pub use mac::validate_mac_address;
pub use status::{SubscriberStatus, UnknownStatus};
pub use tag::{TAG_MAX, TAG_MIN, TAG_RANGE, TagKind};

use serde::{Deserialize, Serialize};

use crate::error::{AccessLineError, ValidationError};
use crate::id::{InstanceId, ServiceId};
use crate::time::{Timestamp, now};

/// Whether a persist or reconciliation call concerns a brand new record.
///
/// Passed explicitly by whoever drives the lifecycle instead of being
/// inferred from stored state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CreationPhase {
    Created,
    Updated,
}

/// One broadband access line.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Subscriber {
    pub id: InstanceId,
    pub name: String,
    pub onu_device: String,
    pub c_tag: Option<u16>,
    pub s_tag: Option<u16>,
    pub mac_address: Option<String>,
    pub service_specific_id: Option<String>,
    pub status: SubscriberStatus,
    pub owner: ServiceId,
    pub creator: Option<String>,
    /// Principal performing the in-flight call. Never persisted.
    #[serde(skip)]
    pub caller: Option<String>,
    pub deleted: bool,
    pub created: Timestamp,
    pub updated: Timestamp,
}

impl Subscriber {
    /// Create a builder for constructing a [`Subscriber`].
    #[must_use]
    pub fn builder() -> SubscriberBuilder {
        SubscriberBuilder::default()
    }

    /// Check field-level invariants.
    ///
    /// # Errors
    ///
    /// Returns [`AccessLineError::Validation`] when `name` or `onu_device` is
    /// empty, or when a set tag falls outside [`TAG_RANGE`].
    pub fn validate(&self) -> Result<(), AccessLineError> {
        if self.name.is_empty() {
            return Err(ValidationError::EmptyName.into());
        }
        if self.onu_device.is_empty() {
            return Err(ValidationError::EmptyOnuDevice.into());
        }
        for (kind, tag) in [(TagKind::CTag, self.c_tag), (TagKind::STag, self.s_tag)] {
            if let Some(value) = tag
                && !TAG_RANGE.contains(&value)
            {
                return Err(ValidationError::TagOutOfRange {
                    tag: kind.as_str(),
                    value,
                    min: TAG_MIN,
                    max: TAG_MAX,
                }
                .into());
            }
        }
        Ok(())
    }

    /// The `(c_tag, s_tag)` pair, when both are set.
    #[must_use]
    pub fn tag_pair(&self) -> Option<(u16, u16)> {
        self.c_tag.zip(self.s_tag)
    }

    /// Whether the access-management probe must confirm `onu_device`.
    #[must_use]
    pub fn requires_access_device(&self) -> bool {
        !self.status.is_pre_provisioned() && !self.deleted
    }
}

/// Step-by-step builder for [`Subscriber`].
#[derive(Debug, Default)]
pub struct SubscriberBuilder {
    id: Option<InstanceId>,
    name: Option<String>,
    onu_device: Option<String>,
    c_tag: Option<u16>,
    s_tag: Option<u16>,
    mac_address: Option<String>,
    service_specific_id: Option<String>,
    status: Option<SubscriberStatus>,
    owner: Option<ServiceId>,
    creator: Option<String>,
    caller: Option<String>,
}

impl SubscriberBuilder {
    #[must_use]
    pub fn id(mut self, id: InstanceId) -> Self {
        self.id = Some(id);
        self
    }

    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn onu_device(mut self, onu_device: impl Into<String>) -> Self {
        self.onu_device = Some(onu_device.into());
        self
    }

    #[must_use]
    pub fn c_tag(mut self, c_tag: u16) -> Self {
        self.c_tag = Some(c_tag);
        self
    }

    #[must_use]
    pub fn s_tag(mut self, s_tag: u16) -> Self {
        self.s_tag = Some(s_tag);
        self
    }

    #[must_use]
    pub fn mac_address(mut self, mac_address: impl Into<String>) -> Self {
        self.mac_address = Some(mac_address.into());
        self
    }

    #[must_use]
    pub fn service_specific_id(mut self, value: impl Into<String>) -> Self {
        self.service_specific_id = Some(value.into());
        self
    }

    #[must_use]
    pub fn status(mut self, status: SubscriberStatus) -> Self {
        self.status = Some(status);
        self
    }

    #[must_use]
    pub fn owner(mut self, owner: ServiceId) -> Self {
        self.owner = Some(owner);
        self
    }

    #[must_use]
    pub fn creator(mut self, creator: impl Into<String>) -> Self {
        self.creator = Some(creator.into());
        self
    }

    #[must_use]
    pub fn caller(mut self, caller: impl Into<String>) -> Self {
        self.caller = Some(caller.into());
        self
    }

    /// Consume the builder, validate, and return a [`Subscriber`].
    ///
    /// # Errors
    ///
    /// Returns [`AccessLineError::Validation`] if `owner` is missing or
    /// `name`/`onu_device` is missing or empty.
    pub fn build(self) -> Result<Subscriber, AccessLineError> {
        let owner = self.owner.ok_or(ValidationError::MissingOwner)?;
        let ts = now();
        let subscriber = Subscriber {
            id: self.id.unwrap_or_default(),
            name: self.name.unwrap_or_default(),
            onu_device: self.onu_device.unwrap_or_default(),
            c_tag: self.c_tag,
            s_tag: self.s_tag,
            mac_address: self.mac_address,
            service_specific_id: self.service_specific_id,
            status: self.status.unwrap_or_default(),
            owner,
            creator: self.creator,
            caller: self.caller,
            deleted: false,
            created: ts,
            updated: ts,
        };
        subscriber.validate()?;
        Ok(subscriber)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn builder() -> SubscriberBuilder {
        Subscriber::builder()
            .name("My House")
            .onu_device("BRCM1234")
            .owner(ServiceId::new())
    }

    #[test]
    fn should_build_subscriber_without_tags() {
        let sub = builder().build().unwrap();
        assert_eq!(sub.name, "My House");
        assert_eq!(sub.onu_device, "BRCM1234");
        assert!(sub.c_tag.is_none());
        assert!(sub.s_tag.is_none());
        assert!(sub.tag_pair().is_none());
        assert!(!sub.deleted);
        assert_eq!(sub.status, SubscriberStatus::PreProvisioned);
    }

    #[test]
    fn should_return_validation_error_when_name_missing() {
        let result = Subscriber::builder()
            .onu_device("BRCM1234")
            .owner(ServiceId::new())
            .build();
        assert!(matches!(
            result,
            Err(AccessLineError::Validation(ValidationError::EmptyName))
        ));
    }

    #[test]
    fn should_return_validation_error_when_onu_device_missing() {
        let result = Subscriber::builder()
            .name("My House")
            .owner(ServiceId::new())
            .build();
        assert!(matches!(
            result,
            Err(AccessLineError::Validation(ValidationError::EmptyOnuDevice))
        ));
    }

    #[test]
    fn should_return_validation_error_when_owner_missing() {
        let result = Subscriber::builder()
            .name("My House")
            .onu_device("BRCM1234")
            .build();
        assert!(matches!(
            result,
            Err(AccessLineError::Validation(ValidationError::MissingOwner))
        ));
    }

    #[test]
    fn should_reject_tags_outside_allocator_range() {
        for (c_tag, s_tag, expected) in [
            (0, 200, "c_tag"),
            (TAG_MIN - 1, 200, "c_tag"),
            (111, TAG_MAX + 1, "s_tag"),
            (111, u16::MAX, "s_tag"),
        ] {
            let result = builder().c_tag(c_tag).s_tag(s_tag).build();
            assert!(
                matches!(
                    &result,
                    Err(AccessLineError::Validation(ValidationError::TagOutOfRange { tag, .. }))
                        if *tag == expected
                ),
                "({c_tag}, {s_tag}) gave {result:?}"
            );
        }
    }

    #[test]
    fn should_accept_tags_on_range_bounds() {
        let sub = builder().c_tag(TAG_MIN).s_tag(TAG_MAX).build().unwrap();
        assert_eq!(sub.tag_pair(), Some((TAG_MIN, TAG_MAX)));
    }

    #[test]
    fn should_expose_pair_only_when_both_tags_set() {
        let only_c = builder().c_tag(111).build().unwrap();
        assert!(only_c.tag_pair().is_none());

        let both = builder().c_tag(111).s_tag(222).build().unwrap();
        assert_eq!(both.tag_pair(), Some((111, 222)));
    }

    #[test]
    fn should_skip_access_check_when_pre_provisioned_or_deleted() {
        let pre = builder().build().unwrap();
        assert!(!pre.requires_access_device());

        let mut enabled = builder().status(SubscriberStatus::Enabled).build().unwrap();
        assert!(enabled.requires_access_device());

        enabled.deleted = true;
        assert!(!enabled.requires_access_device());
    }

    #[test]
    fn should_not_serialize_caller() {
        let sub = builder().caller("admin@example.com").build().unwrap();
        let json = serde_json::to_value(&sub).unwrap();
        assert!(json.get("caller").is_none());

        let parsed: Subscriber = serde_json::from_value(json).unwrap();
        assert!(parsed.caller.is_none());
        assert_eq!(parsed.id, sub.id);
    }
}
