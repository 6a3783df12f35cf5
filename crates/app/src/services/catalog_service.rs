//! Catalog service — declares services and their dependency edges.
//!
//! Services are identified by name. Declaring the same catalog twice leaves
//! the graph unchanged; a redeclared service keeps its id and picks up the
//! new capability and access mode.

use accessline_domain::error::{AccessLineError, NotFoundError};
use accessline_domain::service::{AccessMode, Service, ServiceDependency};

use crate::ports::ServiceRepository;

/// One service of a declared catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceDeclaration {
    pub name: String,
    pub capability: String,
    pub access: AccessMode,
    /// Names of the services this one depends on, in order. The first one
    /// is the access manager of a device-managed service.
    pub providers: Vec<String>,
}

/// Application service for the service graph.
pub struct CatalogService<R> {
    repo: R,
}

impl<R: ServiceRepository + Send + Sync> CatalogService<R> {
    /// Create a new service backed by the given repository.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Create a service, or update the one with the same name.
    ///
    /// # Errors
    ///
    /// Returns [`AccessLineError::Validation`] if invariants fail, or a
    /// storage error propagated from the repository.
    #[tracing::instrument(skip(self, service), fields(service_name = %service.name))]
    pub async fn upsert_service(&self, service: Service) -> Result<Service, AccessLineError> {
        service.validate()?;
        match self.repo.find_by_name(&service.name).await? {
            Some(existing) if existing.capability == service.capability && existing.access == service.access => {
                Ok(existing)
            }
            Some(existing) => {
                self.repo
                    .update(Service {
                        id: existing.id,
                        ..service
                    })
                    .await
            }
            None => self.repo.create(service).await,
        }
    }

    /// Declare a whole catalog: every service first, then the missing edges.
    ///
    /// # Errors
    ///
    /// Returns [`AccessLineError::NotFound`] when a provider name matches no
    /// declared or stored service, or any error of [`Self::upsert_service`].
    #[tracing::instrument(skip_all, fields(count = declarations.len()))]
    pub async fn declare(
        &self,
        declarations: &[ServiceDeclaration],
    ) -> Result<Vec<Service>, AccessLineError> {
        let mut declared = Vec::with_capacity(declarations.len());
        for decl in declarations {
            let service = Service::new(decl.name.clone(), decl.capability.clone()).with_access(decl.access);
            declared.push(self.upsert_service(service).await?);
        }

        for (decl, service) in declarations.iter().zip(&declared) {
            let existing = self.repo.subscribed_dependencies(service.id).await?;
            for provider_name in &decl.providers {
                let provider = self.repo.find_by_name(provider_name).await?.ok_or_else(|| {
                    NotFoundError {
                        entity: "Service",
                        id: provider_name.clone(),
                    }
                })?;
                if existing.iter().any(|d| d.provider_service == provider.id) {
                    continue;
                }
                self.repo
                    .add_dependency(ServiceDependency::new(service.id, provider.id))
                    .await?;
                tracing::debug!(subscriber = %service.name, provider = %provider.name, "added dependency");
            }
        }

        tracing::info!(count = declared.len(), "service catalog declared");
        Ok(declared)
    }

    /// List all services.
    ///
    /// # Errors
    ///
    /// Returns a storage error propagated from the repository.
    pub async fn list_services(&self) -> Result<Vec<Service>, AccessLineError> {
        self.repo.get_all().await
    }
}
