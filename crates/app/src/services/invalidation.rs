//! Invalidation propagator — marks provider instances two hops away as dirty.
//!
//! Starting from a subscriber, the propagator follows the links whose
//! subscriber side is the subscriber (first hop), then the links whose
//! subscriber side is each first-hop provider (second hop), and touches every
//! second-hop provider so the external synchronizer picks it up.
//!
//! The walk is split in three phases: a snapshot of both hops, a pure
//! [`plan_invalidation`] over that snapshot, and a touch pass. Failures never
//! propagate to the caller; they are logged and reported.

use std::collections::{HashMap, HashSet};

use accessline_domain::id::InstanceId;
use accessline_domain::instance::ServiceInstanceLink;
use accessline_domain::subscriber::Subscriber;

use crate::ports::{ServiceInstanceLinkRepository, ServiceInstanceRepository};

/// Outcome of one invalidation pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InvalidationReport {
    /// Instances whose `updated` timestamp was bumped.
    pub touched: Vec<InstanceId>,
    /// Instances whose touch failed.
    pub failed: Vec<InstanceId>,
}

impl InvalidationReport {
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Compute the second-hop instances to touch, deduplicated, in discovery order.
///
/// `second_hop` maps each first-hop provider to the links whose subscriber
/// side is that provider. Providers absent from the map contribute nothing.
#[must_use]
pub fn plan_invalidation(
    first_hop: &[ServiceInstanceLink],
    second_hop: &HashMap<InstanceId, Vec<ServiceInstanceLink>>,
) -> Vec<InstanceId> {
    let mut seen = HashSet::new();
    first_hop
        .iter()
        .filter_map(|link| second_hop.get(&link.provider_service_instance))
        .flatten()
        .map(|link| link.provider_service_instance)
        .filter(|id| seen.insert(*id))
        .collect()
}

/// Walks the instance graph around a subscriber and touches what it finds.
pub struct InvalidationPropagator<LR, IR> {
    links: LR,
    instances: IR,
}

impl<LR, IR> InvalidationPropagator<LR, IR>
where
    LR: ServiceInstanceLinkRepository + Send + Sync,
    IR: ServiceInstanceRepository + Send + Sync,
{
    pub fn new(links: LR, instances: IR) -> Self {
        Self { links, instances }
    }

    /// Touch every provider instance two link hops away from `subscriber`.
    ///
    /// A failed first-hop query yields an empty report. A failed second-hop
    /// query drops that branch only. Both are logged.
    #[tracing::instrument(skip(self, subscriber), fields(subscriber_id = %subscriber.id))]
    pub async fn invalidate_related_objects(&self, subscriber: &Subscriber) -> InvalidationReport {
        let first_hop = match self.links.find_by_subscriber_instance(subscriber.id).await {
            Ok(links) => links,
            Err(err) => {
                tracing::warn!(error = %err, "failed to load subscriber links");
                return InvalidationReport::default();
            }
        };

        let mut second_hop = HashMap::with_capacity(first_hop.len());
        for link in &first_hop {
            let provider = link.provider_service_instance;
            if second_hop.contains_key(&provider) {
                continue;
            }
            match self.links.find_by_subscriber_instance(provider).await {
                Ok(links) => {
                    second_hop.insert(provider, links);
                }
                Err(err) => {
                    tracing::warn!(instance_id = %provider, error = %err, "failed to load provider links");
                }
            }
        }

        let mut report = InvalidationReport::default();
        for id in plan_invalidation(&first_hop, &second_hop) {
            match self.instances.touch(id).await {
                Ok(()) => report.touched.push(id),
                Err(err) => {
                    tracing::warn!(instance_id = %id, error = %err, "failed to invalidate instance");
                    report.failed.push(id);
                }
            }
        }
        tracing::debug!(
            touched = report.touched.len(),
            failed = report.failed.len(),
            "invalidation pass complete"
        );
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{InMemoryInstances, InMemoryLinks};
    use accessline_domain::id::ServiceId;
    use accessline_domain::instance::ServiceInstance;

    fn subscriber() -> Subscriber {
        Subscriber::builder()
            .name("My House")
            .onu_device("BRCM1234")
            .owner(ServiceId::new())
            .build()
            .unwrap()
    }

    fn instance(instances: &InMemoryInstances, name: &str) -> InstanceId {
        let inst = ServiceInstance::new(name, ServiceId::new(), "access-line-controller");
        instances.insert(&inst);
        inst.id
    }

    #[test]
    fn should_plan_nothing_without_links() {
        assert!(plan_invalidation(&[], &HashMap::new()).is_empty());
    }

    #[test]
    fn should_plan_second_hop_only_and_deduplicate() {
        let sub = InstanceId::new();
        let (a, b, x, y) = (
            InstanceId::new(),
            InstanceId::new(),
            InstanceId::new(),
            InstanceId::new(),
        );
        let first = vec![
            ServiceInstanceLink::new(sub, a),
            ServiceInstanceLink::new(sub, b),
        ];
        let second = HashMap::from([
            (
                a,
                vec![ServiceInstanceLink::new(a, x), ServiceInstanceLink::new(a, y)],
            ),
            (b, vec![ServiceInstanceLink::new(b, x)]),
        ]);

        assert_eq!(plan_invalidation(&first, &second), vec![x, y]);
    }

    #[tokio::test]
    async fn should_touch_only_second_hop_instances() {
        let links = InMemoryLinks::default();
        let instances = InMemoryInstances::default();
        let sub = subscriber();
        let olt = instance(&instances, "olt-for-house");
        let bng = instance(&instances, "bng");
        links.link(sub.id, olt);
        links.link(olt, bng);

        let propagator = InvalidationPropagator::new(links, instances.clone());
        let report = propagator.invalidate_related_objects(&sub).await;

        assert_eq!(report.touched, vec![bng]);
        assert!(report.is_clean());
        assert_eq!(instances.touched(), vec![bng]);
    }

    #[tokio::test]
    async fn should_touch_nothing_when_subscriber_has_no_links() {
        let instances = InMemoryInstances::default();
        let propagator = InvalidationPropagator::new(InMemoryLinks::default(), instances.clone());

        let report = propagator.invalidate_related_objects(&subscriber()).await;

        assert_eq!(report, InvalidationReport::default());
        assert!(instances.touched().is_empty());
    }

    #[tokio::test]
    async fn should_touch_shared_provider_once() {
        let links = InMemoryLinks::default();
        let instances = InMemoryInstances::default();
        let sub = subscriber();
        let a = instance(&instances, "a");
        let b = instance(&instances, "b");
        let shared = instance(&instances, "shared");
        links.link(sub.id, a);
        links.link(sub.id, b);
        links.link(a, shared);
        links.link(b, shared);

        let propagator = InvalidationPropagator::new(links, instances.clone());
        let report = propagator.invalidate_related_objects(&sub).await;

        assert_eq!(report.touched, vec![shared]);
        assert_eq!(instances.touched(), vec![shared]);
    }

    #[tokio::test]
    async fn should_continue_after_touch_failure() {
        let links = InMemoryLinks::default();
        let instances = InMemoryInstances::default();
        let sub = subscriber();
        let olt = instance(&instances, "olt");
        let broken = instance(&instances, "broken");
        let fine = instance(&instances, "fine");
        links.link(sub.id, olt);
        links.link(olt, broken);
        links.link(olt, fine);
        instances.fail_touch(broken);

        let propagator = InvalidationPropagator::new(links, instances.clone());
        let report = propagator.invalidate_related_objects(&sub).await;

        assert_eq!(report.failed, vec![broken]);
        assert_eq!(report.touched, vec![fine]);
        assert!(!report.is_clean());
    }
}
