//! Subscriber service — persist-time validation and tag allocation.
//!
//! Every persist runs the same ordered pipeline and stops at the first
//! failure:
//!
//! 1. `service_specific_id` is unique among live subscribers
//! 2. `creator` is set, taken from `caller` when missing
//! 3. `mac_address`, when present, is well-formed
//! 4. `c_tag`, when present, is unused on the same ONU device
//! 5. `(c_tag, s_tag)`, when both present, is unused system-wide
//! 6. missing tags are allocated
//! 7. the owning service exists
//! 8. a device-managed owner confirms the ONU device exists
//! 9. the record is written
//! 10. related provider instances are invalidated and an event is published
//!
//! An update that keeps its stored tag (or pair) is exempt from the matching
//! uniqueness check. Steps 1 through 9 run under a single allocation guard so
//! concurrent persists cannot interleave a check with another write.

use tokio::sync::Mutex;

use accessline_domain::error::{
    AccessLineError, DependencyError, NotFoundError, ProgrammingError, ValidationError,
};
use accessline_domain::event::SubscriberEvent;
use accessline_domain::id::InstanceId;
use accessline_domain::service::{AccessMode, Service};
use accessline_domain::subscriber::{CreationPhase, Subscriber, validate_mac_address};
use accessline_domain::time::now;

use crate::ports::{
    AccessDeviceProbe, EventPublisher, ServiceInstanceLinkRepository, ServiceInstanceRepository,
    ServiceRepository, SubscriberRepository,
};
use crate::services::invalidation::InvalidationPropagator;
use crate::services::tag_allocator::{TagAllocator, pair_owner, used_c_tags};

/// Application service for subscriber lifecycle operations.
pub struct SubscriberService<SR, SVR, LR, IR, AP, EP> {
    subscribers: SR,
    services: SVR,
    probe: AP,
    publisher: EP,
    propagator: InvalidationPropagator<LR, IR>,
    allocator: TagAllocator,
    guard: Mutex<()>,
}

impl<SR, SVR, LR, IR, AP, EP> SubscriberService<SR, SVR, LR, IR, AP, EP>
where
    SR: SubscriberRepository + Send + Sync,
    SVR: ServiceRepository + Send + Sync,
    LR: ServiceInstanceLinkRepository + Send + Sync,
    IR: ServiceInstanceRepository + Send + Sync,
    AP: AccessDeviceProbe + Send + Sync,
    EP: EventPublisher + Send + Sync,
{
    pub fn new(
        subscribers: SR,
        services: SVR,
        probe: AP,
        publisher: EP,
        propagator: InvalidationPropagator<LR, IR>,
        allocator: TagAllocator,
    ) -> Self {
        Self {
            subscribers,
            services,
            probe,
            publisher,
            propagator,
            allocator,
            guard: Mutex::new(()),
        }
    }

    /// Validate, complete and insert a new subscriber.
    ///
    /// # Errors
    ///
    /// Returns [`AccessLineError::Validation`] when an invariant fails,
    /// [`AccessLineError::Programming`] when neither `creator` nor `caller`
    /// is set, [`AccessLineError::Allocation`] when the tag space is
    /// exhausted, [`AccessLineError::NotFound`] when the owner is missing,
    /// [`AccessLineError::Dependency`] when a device-managed owner has no
    /// access manager, or a storage error from the repositories.
    #[tracing::instrument(skip(self, subscriber), fields(subscriber_name = %subscriber.name))]
    pub async fn create_subscriber(
        &self,
        subscriber: Subscriber,
    ) -> Result<Subscriber, AccessLineError> {
        self.persist(subscriber, CreationPhase::Created).await
    }

    /// Validate, complete and overwrite an existing subscriber.
    ///
    /// # Errors
    ///
    /// Same as [`Self::create_subscriber`], plus [`AccessLineError::NotFound`]
    /// when no subscriber with this id was stored.
    #[tracing::instrument(skip(self, subscriber), fields(subscriber_id = %subscriber.id))]
    pub async fn update_subscriber(
        &self,
        subscriber: Subscriber,
    ) -> Result<Subscriber, AccessLineError> {
        self.persist(subscriber, CreationPhase::Updated).await
    }

    /// Soft-delete a subscriber. Its tags become available to others.
    ///
    /// # Errors
    ///
    /// Returns [`AccessLineError::NotFound`] when no subscriber with `id`
    /// exists, or any error of [`Self::update_subscriber`].
    #[tracing::instrument(skip(self, caller))]
    pub async fn delete_subscriber(
        &self,
        id: InstanceId,
        caller: Option<String>,
    ) -> Result<Subscriber, AccessLineError> {
        let mut subscriber = self.get_subscriber(id).await?;
        subscriber.deleted = true;
        subscriber.caller = caller;
        self.persist(subscriber, CreationPhase::Updated).await
    }

    /// Look up a subscriber by id, returning an error if not found.
    ///
    /// # Errors
    ///
    /// Returns [`AccessLineError::NotFound`] when no subscriber with `id`
    /// exists, or a storage error from the repository.
    #[tracing::instrument(skip(self))]
    pub async fn get_subscriber(&self, id: InstanceId) -> Result<Subscriber, AccessLineError> {
        self.subscribers
            .get_by_id(id)
            .await?
            .ok_or_else(|| not_found(id).into())
    }

    /// List all live subscribers.
    ///
    /// # Errors
    ///
    /// Returns a storage error propagated from the repository.
    pub async fn list_subscribers(&self) -> Result<Vec<Subscriber>, AccessLineError> {
        let all = self.subscribers.get_all().await?;
        Ok(all.into_iter().filter(|s| !s.deleted).collect())
    }

    async fn persist(
        &self,
        mut subscriber: Subscriber,
        phase: CreationPhase,
    ) -> Result<Subscriber, AccessLineError> {
        subscriber.validate()?;

        let saved = {
            let _guard = self.guard.lock().await;

            let stored = self.subscribers.get_by_id(subscriber.id).await?;
            if phase == CreationPhase::Updated && stored.is_none() {
                return Err(not_found(subscriber.id).into());
            }
            let previous = stored.filter(|_| phase == CreationPhase::Updated);

            self.check_service_specific_id(&subscriber).await?;
            ensure_creator(&mut subscriber)?;
            if let Some(mac) = subscriber.mac_address.as_deref() {
                validate_mac_address(mac)?;
            }
            self.check_tags(&subscriber, previous.as_ref()).await?;
            self.allocate_missing_tags(&mut subscriber).await?;

            let owner = self.resolve_owner(&subscriber).await?;
            if owner.access == AccessMode::DeviceManaged && subscriber.requires_access_device() {
                self.check_access_device(&owner, &subscriber).await?;
            }

            subscriber.updated = now();
            match previous {
                Some(previous) => {
                    subscriber.created = previous.created;
                    self.subscribers.update(subscriber).await?
                }
                None => {
                    subscriber.created = subscriber.updated;
                    self.subscribers.create(subscriber).await?
                }
            }
        };

        let report = self.propagator.invalidate_related_objects(&saved).await;
        if !report.is_clean() {
            tracing::warn!(failed = report.failed.len(), "some related instances were not invalidated");
        }
        if let Err(err) = self
            .publisher
            .publish(SubscriberEvent::new(phase, saved.clone()))
            .await
        {
            tracing::warn!(error = %err, "failed to publish subscriber event");
        }
        tracing::info!(subscriber_id = %saved.id, ?phase, "subscriber persisted");
        Ok(saved)
    }

    async fn check_service_specific_id(&self, subscriber: &Subscriber) -> Result<(), AccessLineError> {
        let Some(value) = subscriber.service_specific_id.as_deref() else {
            return Ok(());
        };
        let taken = self
            .subscribers
            .find_by_service_specific_id(value)
            .await?
            .iter()
            .any(|other| other.id != subscriber.id);
        if taken {
            return Err(ValidationError::DuplicateServiceSpecificId(value.to_string()).into());
        }
        Ok(())
    }

    async fn check_tags(
        &self,
        subscriber: &Subscriber,
        previous: Option<&Subscriber>,
    ) -> Result<(), AccessLineError> {
        if let Some(c_tag) = subscriber.c_tag {
            let unchanged = previous.is_some_and(|p| p.c_tag == Some(c_tag));
            if !unchanged && used_c_tags(&self.subscribers, subscriber).await?.contains(&c_tag) {
                return Err(ValidationError::CTagInUse {
                    c_tag,
                    onu_device: subscriber.onu_device.clone(),
                }
                .into());
            }
        }

        if let Some((c_tag, s_tag)) = subscriber.tag_pair() {
            let unchanged = previous.is_some_and(|p| p.tag_pair() == Some((c_tag, s_tag)));
            if !unchanged && let Some(other) = pair_owner(&self.subscribers, subscriber).await? {
                return Err(ValidationError::TagPairInUse {
                    c_tag,
                    s_tag,
                    subscriber_id: other.to_string(),
                }
                .into());
            }
        }
        Ok(())
    }

    async fn allocate_missing_tags(&self, subscriber: &mut Subscriber) -> Result<(), AccessLineError> {
        if subscriber.c_tag.is_none() {
            // Also fills the S-tag when it is missing.
            self.allocator
                .allocate_c_tag(&self.subscribers, subscriber)
                .await?;
        } else if subscriber.s_tag.is_none() {
            self.allocator
                .allocate_s_tag(&self.subscribers, subscriber)
                .await?;
        }
        Ok(())
    }

    async fn resolve_owner(&self, subscriber: &Subscriber) -> Result<Service, AccessLineError> {
        self.services
            .get_by_id(subscriber.owner)
            .await?
            .ok_or_else(|| {
                NotFoundError {
                    entity: "Service",
                    id: subscriber.owner.to_string(),
                }
                .into()
            })
    }

    async fn check_access_device(
        &self,
        owner: &Service,
        subscriber: &Subscriber,
    ) -> Result<(), AccessLineError> {
        let dependencies = self.services.subscribed_dependencies(owner.id).await?;
        let Some(first) = dependencies.first() else {
            return Err(DependencyError::NoAccessManager(owner.name.clone()).into());
        };
        let manager = self
            .services
            .get_by_id(first.provider_service)
            .await?
            .ok_or_else(|| NotFoundError {
                entity: "Service",
                id: first.provider_service.to_string(),
            })?;

        if !self
            .probe
            .has_access_device(&manager, &subscriber.onu_device)
            .await?
        {
            return Err(ValidationError::AccessDeviceNotFound(subscriber.onu_device.clone()).into());
        }
        Ok(())
    }
}

fn ensure_creator(subscriber: &mut Subscriber) -> Result<(), AccessLineError> {
    if subscriber.creator.is_none() {
        let caller = subscriber
            .caller
            .clone()
            .ok_or(ProgrammingError::MissingCaller)?;
        subscriber.creator = Some(caller);
    }
    Ok(())
}

fn not_found(id: InstanceId) -> NotFoundError {
    NotFoundError {
        entity: "Subscriber",
        id: id.to_string(),
    }
}
