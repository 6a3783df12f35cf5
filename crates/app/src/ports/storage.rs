//! Storage port — repository traits for persistence.
//!
//! Query methods that scope the uniqueness checks (`find_by_onu_device`,
//! `find_by_tags`, `find_by_service_specific_id`) return non-deleted
//! subscribers only. Point lookups return soft-deleted records too.

use std::future::Future;

use accessline_domain::error::AccessLineError;
use accessline_domain::id::{InstanceId, ServiceId};
use accessline_domain::instance::{ServiceInstance, ServiceInstanceLink};
use accessline_domain::service::{Service, ServiceDependency};
use accessline_domain::subscriber::Subscriber;

/// Repository for persisting and querying [`Subscriber`]s.
pub trait SubscriberRepository {
    /// Insert a subscriber that has never been persisted.
    fn create(
        &self,
        subscriber: Subscriber,
    ) -> impl Future<Output = Result<Subscriber, AccessLineError>> + Send;

    /// Get a subscriber by its unique identifier.
    fn get_by_id(
        &self,
        id: InstanceId,
    ) -> impl Future<Output = Result<Option<Subscriber>, AccessLineError>> + Send;

    /// Get all subscribers, soft-deleted ones included.
    fn get_all(&self) -> impl Future<Output = Result<Vec<Subscriber>, AccessLineError>> + Send;

    /// Overwrite an existing subscriber.
    fn update(
        &self,
        subscriber: Subscriber,
    ) -> impl Future<Output = Result<Subscriber, AccessLineError>> + Send;

    /// Subscribers attached to the given ONU device.
    fn find_by_onu_device(
        &self,
        onu_device: &str,
    ) -> impl Future<Output = Result<Vec<Subscriber>, AccessLineError>> + Send;

    /// Subscribers holding exactly this `(c_tag, s_tag)` pair.
    fn find_by_tags(
        &self,
        c_tag: u16,
        s_tag: u16,
    ) -> impl Future<Output = Result<Vec<Subscriber>, AccessLineError>> + Send;

    /// Subscribers carrying this service-specific identifier.
    fn find_by_service_specific_id(
        &self,
        value: &str,
    ) -> impl Future<Output = Result<Vec<Subscriber>, AccessLineError>> + Send;
}

/// Repository for declared [`Service`]s and their [`ServiceDependency`] edges.
pub trait ServiceRepository {
    fn create(&self, service: Service)
    -> impl Future<Output = Result<Service, AccessLineError>> + Send;

    fn get_by_id(
        &self,
        id: ServiceId,
    ) -> impl Future<Output = Result<Option<Service>, AccessLineError>> + Send;

    fn find_by_name(
        &self,
        name: &str,
    ) -> impl Future<Output = Result<Option<Service>, AccessLineError>> + Send;

    fn get_all(&self) -> impl Future<Output = Result<Vec<Service>, AccessLineError>> + Send;

    fn update(&self, service: Service)
    -> impl Future<Output = Result<Service, AccessLineError>> + Send;

    /// Append a dependency edge. Edges keep their insertion order.
    fn add_dependency(
        &self,
        dependency: ServiceDependency,
    ) -> impl Future<Output = Result<ServiceDependency, AccessLineError>> + Send;

    /// Dependencies in which `service` is the subscriber side, in insertion order.
    fn subscribed_dependencies(
        &self,
        service: ServiceId,
    ) -> impl Future<Output = Result<Vec<ServiceDependency>, AccessLineError>> + Send;
}

/// Repository for provider-side [`ServiceInstance`]s.
pub trait ServiceInstanceRepository {
    fn create(
        &self,
        instance: ServiceInstance,
    ) -> impl Future<Output = Result<ServiceInstance, AccessLineError>> + Send;

    fn get_by_id(
        &self,
        id: InstanceId,
    ) -> impl Future<Output = Result<Option<ServiceInstance>, AccessLineError>> + Send;

    /// Bump only the `updated` timestamp, marking the instance dirty.
    fn touch(&self, id: InstanceId) -> impl Future<Output = Result<(), AccessLineError>> + Send;

    /// Remove an instance. Removing an unknown id is not an error.
    fn delete(&self, id: InstanceId) -> impl Future<Output = Result<(), AccessLineError>> + Send;
}

/// Repository for [`ServiceInstanceLink`]s.
pub trait ServiceInstanceLinkRepository {
    fn create(
        &self,
        link: ServiceInstanceLink,
    ) -> impl Future<Output = Result<ServiceInstanceLink, AccessLineError>> + Send;

    /// Links whose subscriber side is `instance`.
    fn find_by_subscriber_instance(
        &self,
        instance: InstanceId,
    ) -> impl Future<Output = Result<Vec<ServiceInstanceLink>, AccessLineError>> + Send;
}
