//! `SQLite` implementation of [`ServiceRepository`].

use std::future::Future;
use std::str::FromStr;

use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, Row, SqlitePool};

use accessline_app::ports::ServiceRepository;
use accessline_domain::error::AccessLineError;
use accessline_domain::id::{DependencyId, ServiceId};
use accessline_domain::service::{AccessMode, Service, ServiceDependency};

use crate::error::{StorageError, decode};

/// Wrapper for converting database rows into domain [`Service`].
struct Wrapper(Service);

impl Wrapper {
    fn maybe(value: Option<Self>) -> Option<Service> {
        value.map(|w| w.0)
    }
}

impl<'r> FromRow<'r, SqliteRow> for Wrapper {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        let id: uuid::Uuid = row.try_get("id")?;
        let name: String = row.try_get("name")?;
        let capability: String = row.try_get("capability")?;
        let access: String = row.try_get("access")?;

        Ok(Self(Service {
            id: ServiceId::from_uuid(id),
            name,
            capability,
            access: AccessMode::from_str(&access).map_err(decode)?,
        }))
    }
}

struct DependencyWrapper(ServiceDependency);

impl<'r> FromRow<'r, SqliteRow> for DependencyWrapper {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        let id: uuid::Uuid = row.try_get("id")?;
        let subscriber: uuid::Uuid = row.try_get("subscriber_service_id")?;
        let provider: uuid::Uuid = row.try_get("provider_service_id")?;

        Ok(Self(ServiceDependency {
            id: DependencyId::from_uuid(id),
            subscriber_service: ServiceId::from_uuid(subscriber),
            provider_service: ServiceId::from_uuid(provider),
        }))
    }
}

const INSERT: &str = "INSERT INTO services (id, name, capability, access) VALUES (?, ?, ?, ?)";
const SELECT_BY_ID: &str = "SELECT * FROM services WHERE id = ?";
const SELECT_BY_NAME: &str = "SELECT * FROM services WHERE name = ?";
const SELECT_ALL: &str = "SELECT * FROM services ORDER BY name";
const UPDATE: &str = "UPDATE services SET name = ?, capability = ?, access = ? WHERE id = ?";

const INSERT_DEPENDENCY: &str = r"
    INSERT INTO service_dependencies (id, subscriber_service_id, provider_service_id)
    VALUES (?, ?, ?)
";
const SELECT_DEPENDENCIES: &str = r"
    SELECT * FROM service_dependencies
    WHERE subscriber_service_id = ?
    ORDER BY rowid ASC
";

/// `SQLite`-backed service repository.
#[derive(Clone)]
pub struct SqliteServiceRepository {
    pool: SqlitePool,
}

impl SqliteServiceRepository {
    /// Create a new repository using the given connection pool.
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

impl ServiceRepository for SqliteServiceRepository {
    fn create(
        &self,
        service: Service,
    ) -> impl Future<Output = Result<Service, AccessLineError>> + Send {
        let pool = self.pool.clone();
        async move {
            sqlx::query(INSERT)
                .bind(service.id.as_uuid())
                .bind(&service.name)
                .bind(&service.capability)
                .bind(service.access.as_str())
                .execute(&pool)
                .await
                .map_err(StorageError::from)?;

            Ok(service)
        }
    }

    fn get_by_id(
        &self,
        id: ServiceId,
    ) -> impl Future<Output = Result<Option<Service>, AccessLineError>> + Send {
        let pool = self.pool.clone();
        async move {
            let row: Option<Wrapper> = sqlx::query_as(SELECT_BY_ID)
                .bind(id.as_uuid())
                .fetch_optional(&pool)
                .await
                .map_err(StorageError::from)?;

            Ok(Wrapper::maybe(row))
        }
    }

    fn find_by_name(
        &self,
        name: &str,
    ) -> impl Future<Output = Result<Option<Service>, AccessLineError>> + Send {
        let pool = self.pool.clone();
        let name = name.to_string();
        async move {
            let row: Option<Wrapper> = sqlx::query_as(SELECT_BY_NAME)
                .bind(name)
                .fetch_optional(&pool)
                .await
                .map_err(StorageError::from)?;

            Ok(Wrapper::maybe(row))
        }
    }

    fn get_all(&self) -> impl Future<Output = Result<Vec<Service>, AccessLineError>> + Send {
        let pool = self.pool.clone();
        async move {
            let rows: Vec<Wrapper> = sqlx::query_as(SELECT_ALL)
                .fetch_all(&pool)
                .await
                .map_err(StorageError::from)?;

            Ok(rows.into_iter().map(|w| w.0).collect())
        }
    }

    fn update(
        &self,
        service: Service,
    ) -> impl Future<Output = Result<Service, AccessLineError>> + Send {
        let pool = self.pool.clone();
        async move {
            sqlx::query(UPDATE)
                .bind(&service.name)
                .bind(&service.capability)
                .bind(service.access.as_str())
                .bind(service.id.as_uuid())
                .execute(&pool)
                .await
                .map_err(StorageError::from)?;

            Ok(service)
        }
    }

    fn add_dependency(
        &self,
        dependency: ServiceDependency,
    ) -> impl Future<Output = Result<ServiceDependency, AccessLineError>> + Send {
        let pool = self.pool.clone();
        async move {
            sqlx::query(INSERT_DEPENDENCY)
                .bind(dependency.id.as_uuid())
                .bind(dependency.subscriber_service.as_uuid())
                .bind(dependency.provider_service.as_uuid())
                .execute(&pool)
                .await
                .map_err(StorageError::from)?;

            Ok(dependency)
        }
    }

    fn subscribed_dependencies(
        &self,
        service: ServiceId,
    ) -> impl Future<Output = Result<Vec<ServiceDependency>, AccessLineError>> + Send {
        let pool = self.pool.clone();
        async move {
            let rows: Vec<DependencyWrapper> = sqlx::query_as(SELECT_DEPENDENCIES)
                .bind(service.as_uuid())
                .fetch_all(&pool)
                .await
                .map_err(StorageError::from)?;

            Ok(rows.into_iter().map(|w| w.0).collect())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::tests::memory_pool;
    use accessline_domain::service::{ACCESS_LINE_CONTROLLER, SUBSCRIBER_CAPABILITY};

    async fn setup() -> SqliteServiceRepository {
        SqliteServiceRepository::new(memory_pool().await)
    }

    #[tokio::test]
    async fn should_create_and_retrieve_service() {
        let repo = setup().await;
        let service =
            Service::new("residential", SUBSCRIBER_CAPABILITY).with_access(AccessMode::DeviceManaged);
        let id = service.id;

        repo.create(service.clone()).await.unwrap();

        let fetched = repo.get_by_id(id).await.unwrap().unwrap();
        assert_eq!(fetched, service);
        let by_name = repo.find_by_name("residential").await.unwrap().unwrap();
        assert_eq!(by_name.id, id);
    }

    #[tokio::test]
    async fn should_return_none_when_service_not_found() {
        let repo = setup().await;
        assert!(repo.get_by_id(ServiceId::new()).await.unwrap().is_none());
        assert!(repo.find_by_name("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn should_reject_duplicate_name() {
        let repo = setup().await;
        repo.create(Service::new("olt", ACCESS_LINE_CONTROLLER))
            .await
            .unwrap();

        let result = repo.create(Service::new("olt", ACCESS_LINE_CONTROLLER)).await;
        assert!(matches!(result, Err(AccessLineError::Storage(_))));
    }

    #[tokio::test]
    async fn should_update_access_mode() {
        let repo = setup().await;
        let mut service = Service::new("residential", SUBSCRIBER_CAPABILITY);
        repo.create(service.clone()).await.unwrap();

        service.access = AccessMode::DeviceManaged;
        repo.update(service.clone()).await.unwrap();

        let fetched = repo.get_by_id(service.id).await.unwrap().unwrap();
        assert_eq!(fetched.access, AccessMode::DeviceManaged);
    }

    #[tokio::test]
    async fn should_keep_dependency_declaration_order() {
        let repo = setup().await;
        let residential = Service::new("residential", SUBSCRIBER_CAPABILITY);
        let olt = Service::new("olt", ACCESS_LINE_CONTROLLER);
        let bng = Service::new("bng", "bng");
        for service in [&residential, &olt, &bng] {
            repo.create(service.clone()).await.unwrap();
        }

        repo.add_dependency(ServiceDependency::new(residential.id, olt.id))
            .await
            .unwrap();
        repo.add_dependency(ServiceDependency::new(residential.id, bng.id))
            .await
            .unwrap();

        let deps = repo.subscribed_dependencies(residential.id).await.unwrap();
        let providers: Vec<ServiceId> = deps.iter().map(|d| d.provider_service).collect();
        assert_eq!(providers, vec![olt.id, bng.id]);
        assert!(repo.subscribed_dependencies(olt.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn should_list_services_by_name() {
        let repo = setup().await;
        repo.create(Service::new("residential", SUBSCRIBER_CAPABILITY))
            .await
            .unwrap();
        repo.create(Service::new("olt", ACCESS_LINE_CONTROLLER))
            .await
            .unwrap();

        let names: Vec<String> = repo
            .get_all()
            .await
            .unwrap()
            .into_iter()
            .map(|s| s.name)
            .collect();
        assert_eq!(names, vec!["olt", "residential"]);
    }
}
