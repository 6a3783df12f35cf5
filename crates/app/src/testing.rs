//! In-memory port implementations shared by the service tests.

use std::collections::{HashMap, HashSet};
use std::future::Future;
use std::sync::{Arc, Mutex};

use accessline_domain::error::AccessLineError;
use accessline_domain::event::SubscriberEvent;
use accessline_domain::id::{InstanceId, ServiceId};
use accessline_domain::instance::{ServiceInstance, ServiceInstanceLink};
use accessline_domain::service::{Service, ServiceDependency};
use accessline_domain::subscriber::Subscriber;

use crate::ports::{
    AccessDeviceProbe, EventPublisher, ServiceInstanceLinkRepository, ServiceInstanceRepository,
    ServiceRepository, SubscriberRepository,
};

#[derive(Debug)]
pub struct StoreFailure;

impl std::fmt::Display for StoreFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("injected store failure")
    }
}

impl std::error::Error for StoreFailure {}

fn failure() -> AccessLineError {
    AccessLineError::Storage(Box::new(StoreFailure))
}

#[derive(Clone, Default)]
pub struct InMemorySubscribers {
    store: Arc<Mutex<HashMap<InstanceId, Subscriber>>>,
}

impl InMemorySubscribers {
    pub fn stored(&self, id: InstanceId) -> Option<Subscriber> {
        self.store.lock().unwrap().get(&id).cloned()
    }

    /// Insert a record directly, bypassing validation.
    pub fn seed(&self, subscriber: Subscriber) {
        self.store
            .lock()
            .unwrap()
            .insert(subscriber.id, subscriber);
    }

    fn filter(&self, predicate: impl Fn(&Subscriber) -> bool) -> Vec<Subscriber> {
        self.store
            .lock()
            .unwrap()
            .values()
            .filter(|s| !s.deleted && predicate(s))
            .cloned()
            .collect()
    }
}

impl SubscriberRepository for InMemorySubscribers {
    fn create(
        &self,
        subscriber: Subscriber,
    ) -> impl Future<Output = Result<Subscriber, AccessLineError>> + Send {
        self.seed(subscriber.clone());
        async { Ok(subscriber) }
    }

    fn get_by_id(
        &self,
        id: InstanceId,
    ) -> impl Future<Output = Result<Option<Subscriber>, AccessLineError>> + Send {
        let result = self.stored(id);
        async { Ok(result) }
    }

    fn get_all(&self) -> impl Future<Output = Result<Vec<Subscriber>, AccessLineError>> + Send {
        let result: Vec<Subscriber> = self.store.lock().unwrap().values().cloned().collect();
        async { Ok(result) }
    }

    fn update(
        &self,
        subscriber: Subscriber,
    ) -> impl Future<Output = Result<Subscriber, AccessLineError>> + Send {
        self.seed(subscriber.clone());
        async { Ok(subscriber) }
    }

    fn find_by_onu_device(
        &self,
        onu_device: &str,
    ) -> impl Future<Output = Result<Vec<Subscriber>, AccessLineError>> + Send {
        let result = self.filter(|s| s.onu_device == onu_device);
        async { Ok(result) }
    }

    fn find_by_tags(
        &self,
        c_tag: u16,
        s_tag: u16,
    ) -> impl Future<Output = Result<Vec<Subscriber>, AccessLineError>> + Send {
        let result = self.filter(|s| s.c_tag == Some(c_tag) && s.s_tag == Some(s_tag));
        async { Ok(result) }
    }

    fn find_by_service_specific_id(
        &self,
        value: &str,
    ) -> impl Future<Output = Result<Vec<Subscriber>, AccessLineError>> + Send {
        let result = self.filter(|s| s.service_specific_id.as_deref() == Some(value));
        async { Ok(result) }
    }
}

#[derive(Clone, Default)]
pub struct InMemoryServices {
    services: Arc<Mutex<HashMap<ServiceId, Service>>>,
    dependencies: Arc<Mutex<Vec<ServiceDependency>>>,
}

impl InMemoryServices {
    pub fn insert(&self, service: &Service) {
        self.services
            .lock()
            .unwrap()
            .insert(service.id, service.clone());
    }

    pub fn depend(&self, subscriber: &Service, provider: &Service) {
        self.dependencies
            .lock()
            .unwrap()
            .push(ServiceDependency::new(subscriber.id, provider.id));
    }
}

impl ServiceRepository for InMemoryServices {
    fn create(
        &self,
        service: Service,
    ) -> impl Future<Output = Result<Service, AccessLineError>> + Send {
        self.insert(&service);
        async { Ok(service) }
    }

    fn get_by_id(
        &self,
        id: ServiceId,
    ) -> impl Future<Output = Result<Option<Service>, AccessLineError>> + Send {
        let result = self.services.lock().unwrap().get(&id).cloned();
        async { Ok(result) }
    }

    fn find_by_name(
        &self,
        name: &str,
    ) -> impl Future<Output = Result<Option<Service>, AccessLineError>> + Send {
        let result = self
            .services
            .lock()
            .unwrap()
            .values()
            .find(|s| s.name == name)
            .cloned();
        async { Ok(result) }
    }

    fn get_all(&self) -> impl Future<Output = Result<Vec<Service>, AccessLineError>> + Send {
        let result: Vec<Service> = self.services.lock().unwrap().values().cloned().collect();
        async { Ok(result) }
    }

    fn update(
        &self,
        service: Service,
    ) -> impl Future<Output = Result<Service, AccessLineError>> + Send {
        self.insert(&service);
        async { Ok(service) }
    }

    fn add_dependency(
        &self,
        dependency: ServiceDependency,
    ) -> impl Future<Output = Result<ServiceDependency, AccessLineError>> + Send {
        self.dependencies.lock().unwrap().push(dependency.clone());
        async { Ok(dependency) }
    }

    fn subscribed_dependencies(
        &self,
        service: ServiceId,
    ) -> impl Future<Output = Result<Vec<ServiceDependency>, AccessLineError>> + Send {
        let result: Vec<ServiceDependency> = self
            .dependencies
            .lock()
            .unwrap()
            .iter()
            .filter(|d| d.subscriber_service == service)
            .cloned()
            .collect();
        async { Ok(result) }
    }
}

#[derive(Clone, Default)]
pub struct InMemoryInstances {
    store: Arc<Mutex<HashMap<InstanceId, ServiceInstance>>>,
    touched: Arc<Mutex<Vec<InstanceId>>>,
    failing: Arc<Mutex<HashSet<InstanceId>>>,
}

impl InMemoryInstances {
    pub fn count(&self) -> usize {
        self.store.lock().unwrap().len()
    }

    pub fn all(&self) -> Vec<ServiceInstance> {
        self.store.lock().unwrap().values().cloned().collect()
    }

    pub fn insert(&self, instance: &ServiceInstance) {
        self.store
            .lock()
            .unwrap()
            .insert(instance.id, instance.clone());
    }

    pub fn touched(&self) -> Vec<InstanceId> {
        self.touched.lock().unwrap().clone()
    }

    /// Make every `touch` of `id` fail.
    pub fn fail_touch(&self, id: InstanceId) {
        self.failing.lock().unwrap().insert(id);
    }
}

impl ServiceInstanceRepository for InMemoryInstances {
    fn create(
        &self,
        instance: ServiceInstance,
    ) -> impl Future<Output = Result<ServiceInstance, AccessLineError>> + Send {
        self.insert(&instance);
        async { Ok(instance) }
    }

    fn get_by_id(
        &self,
        id: InstanceId,
    ) -> impl Future<Output = Result<Option<ServiceInstance>, AccessLineError>> + Send {
        let result = self.store.lock().unwrap().get(&id).cloned();
        async { Ok(result) }
    }

    fn touch(&self, id: InstanceId) -> impl Future<Output = Result<(), AccessLineError>> + Send {
        let result = if self.failing.lock().unwrap().contains(&id) {
            Err(failure())
        } else {
            if let Some(instance) = self.store.lock().unwrap().get_mut(&id) {
                instance.updated = accessline_domain::time::now();
            }
            self.touched.lock().unwrap().push(id);
            Ok(())
        };
        async { result }
    }

    fn delete(&self, id: InstanceId) -> impl Future<Output = Result<(), AccessLineError>> + Send {
        self.store.lock().unwrap().remove(&id);
        async { Ok(()) }
    }
}

#[derive(Clone, Default)]
pub struct InMemoryLinks {
    store: Arc<Mutex<Vec<ServiceInstanceLink>>>,
    failures: Arc<Mutex<usize>>,
}

impl InMemoryLinks {
    pub fn count(&self) -> usize {
        self.store.lock().unwrap().len()
    }

    pub fn link(&self, subscriber: InstanceId, provider: InstanceId) {
        self.store
            .lock()
            .unwrap()
            .push(ServiceInstanceLink::new(subscriber, provider));
    }

    /// Make the next `times` calls to `create` fail.
    pub fn fail_next_creates(&self, times: usize) {
        *self.failures.lock().unwrap() = times;
    }
}

impl ServiceInstanceLinkRepository for InMemoryLinks {
    fn create(
        &self,
        link: ServiceInstanceLink,
    ) -> impl Future<Output = Result<ServiceInstanceLink, AccessLineError>> + Send {
        let result = {
            let mut failures = self.failures.lock().unwrap();
            if *failures > 0 {
                *failures -= 1;
                Err(failure())
            } else {
                self.store.lock().unwrap().push(link.clone());
                Ok(link)
            }
        };
        async { result }
    }

    fn find_by_subscriber_instance(
        &self,
        instance: InstanceId,
    ) -> impl Future<Output = Result<Vec<ServiceInstanceLink>, AccessLineError>> + Send {
        let result: Vec<ServiceInstanceLink> = self
            .store
            .lock()
            .unwrap()
            .iter()
            .filter(|l| l.subscriber_service_instance == instance)
            .cloned()
            .collect();
        async { Ok(result) }
    }
}

/// Access probe answering from a fixed device list.
#[derive(Clone, Default)]
pub struct StaticProbe {
    devices: Arc<HashSet<String>>,
}

impl StaticProbe {
    pub fn with(devices: &[&str]) -> Self {
        Self {
            devices: Arc::new(devices.iter().map(|d| (*d).to_string()).collect()),
        }
    }
}

impl AccessDeviceProbe for StaticProbe {
    fn has_access_device(
        &self,
        _provider: &Service,
        onu_device: &str,
    ) -> impl Future<Output = Result<bool, AccessLineError>> + Send {
        let known = self.devices.contains(onu_device);
        async move { Ok(known) }
    }
}

#[derive(Clone, Default)]
pub struct RecordingPublisher {
    events: Arc<Mutex<Vec<SubscriberEvent>>>,
}

impl RecordingPublisher {
    pub fn events(&self) -> Vec<SubscriberEvent> {
        self.events.lock().unwrap().clone()
    }
}

impl EventPublisher for RecordingPublisher {
    fn publish(
        &self,
        event: SubscriberEvent,
    ) -> impl Future<Output = Result<(), AccessLineError>> + Send {
        self.events.lock().unwrap().push(event);
        async { Ok(()) }
    }
}
