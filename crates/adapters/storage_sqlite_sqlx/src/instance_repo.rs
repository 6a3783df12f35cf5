//! `SQLite` implementation of [`ServiceInstanceRepository`].

use std::future::Future;

use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, Row, SqlitePool};

use accessline_app::ports::ServiceInstanceRepository;
use accessline_domain::error::{AccessLineError, NotFoundError};
use accessline_domain::id::{InstanceId, ServiceId};
use accessline_domain::instance::ServiceInstance;
use accessline_domain::time::{now, parse_rfc3339};

use crate::error::{StorageError, decode};

/// Wrapper for converting database rows into domain [`ServiceInstance`].
struct Wrapper(ServiceInstance);

impl<'r> FromRow<'r, SqliteRow> for Wrapper {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        let id: uuid::Uuid = row.try_get("id")?;
        let owner: uuid::Uuid = row.try_get("owner_id")?;
        let created: String = row.try_get("created")?;
        let updated: String = row.try_get("updated")?;

        Ok(Self(ServiceInstance {
            id: InstanceId::from_uuid(id),
            name: row.try_get("name")?,
            owner: ServiceId::from_uuid(owner),
            capability: row.try_get("capability")?,
            created: parse_rfc3339(&created).map_err(decode)?,
            updated: parse_rfc3339(&updated).map_err(decode)?,
        }))
    }
}

const INSERT: &str = r"
    INSERT INTO service_instances (id, name, owner_id, capability, created, updated)
    VALUES (?, ?, ?, ?, ?, ?)
";
const SELECT_BY_ID: &str = "SELECT * FROM service_instances WHERE id = ?";
const TOUCH: &str = "UPDATE service_instances SET updated = ? WHERE id = ?";
const DELETE: &str = "DELETE FROM service_instances WHERE id = ?";

/// `SQLite`-backed service instance repository.
#[derive(Clone)]
pub struct SqliteServiceInstanceRepository {
    pool: SqlitePool,
}

impl SqliteServiceInstanceRepository {
    /// Create a new repository using the given connection pool.
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

impl ServiceInstanceRepository for SqliteServiceInstanceRepository {
    fn create(
        &self,
        instance: ServiceInstance,
    ) -> impl Future<Output = Result<ServiceInstance, AccessLineError>> + Send {
        let pool = self.pool.clone();
        async move {
            sqlx::query(INSERT)
                .bind(instance.id.as_uuid())
                .bind(&instance.name)
                .bind(instance.owner.as_uuid())
                .bind(&instance.capability)
                .bind(instance.created.to_rfc3339())
                .bind(instance.updated.to_rfc3339())
                .execute(&pool)
                .await
                .map_err(StorageError::from)?;

            Ok(instance)
        }
    }

    fn get_by_id(
        &self,
        id: InstanceId,
    ) -> impl Future<Output = Result<Option<ServiceInstance>, AccessLineError>> + Send {
        let pool = self.pool.clone();
        async move {
            let row: Option<Wrapper> = sqlx::query_as(SELECT_BY_ID)
                .bind(id.as_uuid())
                .fetch_optional(&pool)
                .await
                .map_err(StorageError::from)?;

            Ok(row.map(|w| w.0))
        }
    }

    fn touch(&self, id: InstanceId) -> impl Future<Output = Result<(), AccessLineError>> + Send {
        let pool = self.pool.clone();
        async move {
            let result = sqlx::query(TOUCH)
                .bind(now().to_rfc3339())
                .bind(id.as_uuid())
                .execute(&pool)
                .await
                .map_err(StorageError::from)?;

            if result.rows_affected() == 0 {
                return Err(NotFoundError {
                    entity: "ServiceInstance",
                    id: id.to_string(),
                }
                .into());
            }
            Ok(())
        }
    }

    fn delete(&self, id: InstanceId) -> impl Future<Output = Result<(), AccessLineError>> + Send {
        let pool = self.pool.clone();
        async move {
            sqlx::query(DELETE)
                .bind(id.as_uuid())
                .execute(&pool)
                .await
                .map_err(StorageError::from)?;

            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::tests::memory_pool;
    use crate::service_repo::SqliteServiceRepository;
    use accessline_app::ports::ServiceRepository;
    use accessline_domain::service::{ACCESS_LINE_CONTROLLER, Service};

    async fn setup() -> (SqliteServiceInstanceRepository, ServiceId) {
        let pool = memory_pool().await;
        let olt = Service::new("olt", ACCESS_LINE_CONTROLLER);
        let olt_id = olt.id;
        SqliteServiceRepository::new(pool.clone())
            .create(olt)
            .await
            .unwrap();
        (SqliteServiceInstanceRepository::new(pool), olt_id)
    }

    #[tokio::test]
    async fn should_create_and_retrieve_instance() {
        let (repo, olt) = setup().await;
        let inst = ServiceInstance::new("olt-for-house", olt, ACCESS_LINE_CONTROLLER);

        repo.create(inst.clone()).await.unwrap();

        let fetched = repo.get_by_id(inst.id).await.unwrap().unwrap();
        assert_eq!(fetched, inst);
    }

    #[tokio::test]
    async fn should_bump_only_updated_on_touch() {
        let (repo, olt) = setup().await;
        let inst = ServiceInstance::new("olt-for-house", olt, ACCESS_LINE_CONTROLLER);
        repo.create(inst.clone()).await.unwrap();

        repo.touch(inst.id).await.unwrap();

        let fetched = repo.get_by_id(inst.id).await.unwrap().unwrap();
        assert_eq!(fetched.created, inst.created);
        assert_eq!(fetched.name, inst.name);
        assert!(fetched.updated >= inst.updated);
    }

    #[tokio::test]
    async fn should_return_not_found_when_touching_unknown_instance() {
        let (repo, _) = setup().await;

        let result = repo.touch(InstanceId::new()).await;
        assert!(matches!(result, Err(AccessLineError::NotFound(_))));
    }

    #[tokio::test]
    async fn should_delete_instance() {
        let (repo, olt) = setup().await;
        let inst = ServiceInstance::new("olt-for-house", olt, ACCESS_LINE_CONTROLLER);
        repo.create(inst.clone()).await.unwrap();

        repo.delete(inst.id).await.unwrap();

        assert!(repo.get_by_id(inst.id).await.unwrap().is_none());
        repo.delete(inst.id).await.unwrap();
    }

    #[tokio::test]
    async fn should_reject_instance_of_unknown_service() {
        let (repo, _) = setup().await;
        let inst = ServiceInstance::new("orphan", ServiceId::new(), ACCESS_LINE_CONTROLLER);

        let result = repo.create(inst).await;
        assert!(matches!(result, Err(AccessLineError::Storage(_))));
    }
}
