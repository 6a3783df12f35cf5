//! Provisioning reconciler — materializes the provider instance behind a new
//! subscriber.
//!
//! On creation, the reconciler picks the single provider service with the
//! target capability among the owner's dependencies, builds one instance for
//! it through the [`InstanceRegistry`], and links the subscriber to it.
//! Pre-provisioned subscribers are deferred. Updates never provision, and a
//! subscriber that already has a link is left alone.

use tokio::sync::broadcast;

use accessline_domain::error::{AccessLineError, DependencyError, NotFoundError};
use accessline_domain::event::SubscriberEvent;
use accessline_domain::id::{InstanceId, LinkId};
use accessline_domain::instance::ServiceInstanceLink;
use accessline_domain::service::{ACCESS_LINE_CONTROLLER, Service};
use accessline_domain::subscriber::{CreationPhase, Subscriber};

use crate::ports::{ServiceInstanceLinkRepository, ServiceInstanceRepository, ServiceRepository};
use crate::services::instance_registry::InstanceRegistry;

/// What a reconciliation call did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProvisioningOutcome {
    /// The subscriber is pre-provisioned; provisioning waits for a later call.
    Deferred,
    /// Not a creation, or the subscriber already has at least one link.
    AlreadyProvisioned,
    Provisioned { instance_id: InstanceId, link_id: LinkId },
}

/// Creates exactly one provider instance and link per new subscriber.
pub struct ProvisioningReconciler<SVR, IR, LR> {
    services: SVR,
    instances: IR,
    links: LR,
    registry: InstanceRegistry,
    target_capability: String,
}

impl<SVR, IR, LR> ProvisioningReconciler<SVR, IR, LR>
where
    SVR: ServiceRepository + Send + Sync,
    IR: ServiceInstanceRepository + Send + Sync,
    LR: ServiceInstanceLinkRepository + Send + Sync,
{
    /// Create a reconciler targeting the access-line controller capability.
    pub fn new(services: SVR, instances: IR, links: LR, registry: InstanceRegistry) -> Self {
        Self {
            services,
            instances,
            links,
            registry,
            target_capability: ACCESS_LINE_CONTROLLER.to_string(),
        }
    }

    #[must_use]
    pub fn with_target_capability(mut self, capability: impl Into<String>) -> Self {
        self.target_capability = capability.into();
        self
    }

    /// Reconcile one subscriber persist.
    ///
    /// # Errors
    ///
    /// Returns [`DependencyError::NoProvider`] or
    /// [`DependencyError::AmbiguousProvider`] when the owner's dependencies do
    /// not contain exactly one provider with the target capability,
    /// [`DependencyError::UnregisteredCapability`] when no factory builds it,
    /// [`AccessLineError::NotFound`] when the owner is missing, or a storage
    /// error from the repositories.
    #[tracing::instrument(skip(self, subscriber), fields(subscriber_id = %subscriber.id))]
    pub async fn handle_create(
        &self,
        subscriber: &Subscriber,
        phase: CreationPhase,
    ) -> Result<ProvisioningOutcome, AccessLineError> {
        if subscriber.status.is_pre_provisioned() {
            return Ok(ProvisioningOutcome::Deferred);
        }
        if phase != CreationPhase::Created
            || !self
                .links
                .find_by_subscriber_instance(subscriber.id)
                .await?
                .is_empty()
        {
            return Ok(ProvisioningOutcome::AlreadyProvisioned);
        }

        let provider = self.select_provider(subscriber).await?;
        let factory = self
            .registry
            .get(&self.target_capability)
            .ok_or_else(|| DependencyError::UnregisteredCapability(self.target_capability.clone()))?;

        let instance = self.instances.create(factory(&provider, subscriber)).await?;
        let link = match self
            .links
            .create(ServiceInstanceLink::new(subscriber.id, instance.id))
            .await
        {
            Ok(link) => link,
            Err(err) => {
                // Without its link the instance is invisible to the
                // idempotency guard and would be built again.
                if let Err(cleanup) = self.instances.delete(instance.id).await {
                    tracing::warn!(
                        instance_id = %instance.id,
                        error = %cleanup,
                        "failed to remove unlinked instance"
                    );
                }
                return Err(err);
            }
        };

        tracing::info!(
            instance_id = %instance.id,
            provider = %provider.name,
            "provisioned subscriber"
        );
        Ok(ProvisioningOutcome::Provisioned {
            instance_id: instance.id,
            link_id: link.id,
        })
    }

    async fn select_provider(&self, subscriber: &Subscriber) -> Result<Service, AccessLineError> {
        let owner = self
            .services
            .get_by_id(subscriber.owner)
            .await?
            .ok_or_else(|| NotFoundError {
                entity: "Service",
                id: subscriber.owner.to_string(),
            })?;

        let mut matches = Vec::new();
        for dependency in self.services.subscribed_dependencies(owner.id).await? {
            if let Some(provider) = self.services.get_by_id(dependency.provider_service).await?
                && provider.provides(&self.target_capability)
            {
                matches.push(provider);
            }
        }

        match matches.len() {
            0 => Err(DependencyError::NoProvider {
                service: owner.name,
                capability: self.target_capability.clone(),
            }
            .into()),
            1 => Ok(matches.swap_remove(0)),
            count => Err(DependencyError::AmbiguousProvider {
                service: owner.name,
                capability: self.target_capability.clone(),
                count,
            }
            .into()),
        }
    }
}

/// Feed every bus event through [`ProvisioningReconciler::handle_create`]
/// until the bus closes.
///
/// Failures are logged and do not stop the worker.
pub async fn run_provisioning_worker<SVR, IR, LR>(
    reconciler: &ProvisioningReconciler<SVR, IR, LR>,
    mut events: broadcast::Receiver<SubscriberEvent>,
) where
    SVR: ServiceRepository + Send + Sync,
    IR: ServiceInstanceRepository + Send + Sync,
    LR: ServiceInstanceLinkRepository + Send + Sync,
{
    loop {
        match events.recv().await {
            Ok(event) => {
                if let Err(err) = reconciler
                    .handle_create(&event.subscriber, event.phase)
                    .await
                {
                    tracing::error!(
                        subscriber_id = %event.subscriber.id,
                        error = %err,
                        "provisioning failed"
                    );
                }
            }
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                tracing::warn!(skipped, "provisioning worker lagged behind the event bus");
            }
            Err(broadcast::error::RecvError::Closed) => break,
        }
    }
    tracing::debug!("provisioning worker stopped");
}
