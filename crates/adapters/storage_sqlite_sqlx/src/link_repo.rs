//! `SQLite` implementation of [`ServiceInstanceLinkRepository`].

use std::future::Future;

use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, Row, SqlitePool};

use accessline_app::ports::ServiceInstanceLinkRepository;
use accessline_domain::error::AccessLineError;
use accessline_domain::id::{InstanceId, LinkId};
use accessline_domain::instance::ServiceInstanceLink;
use accessline_domain::time::parse_rfc3339;

use crate::error::{StorageError, decode};

struct Wrapper(ServiceInstanceLink);

impl<'r> FromRow<'r, SqliteRow> for Wrapper {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        let id: uuid::Uuid = row.try_get("id")?;
        let subscriber: uuid::Uuid = row.try_get("subscriber_instance_id")?;
        let provider: uuid::Uuid = row.try_get("provider_instance_id")?;
        let created: String = row.try_get("created")?;

        Ok(Self(ServiceInstanceLink {
            id: LinkId::from_uuid(id),
            subscriber_service_instance: InstanceId::from_uuid(subscriber),
            provider_service_instance: InstanceId::from_uuid(provider),
            created: parse_rfc3339(&created).map_err(decode)?,
        }))
    }
}

const INSERT: &str = r"
    INSERT INTO service_instance_links (id, subscriber_instance_id, provider_instance_id, created)
    VALUES (?, ?, ?, ?)
";
const SELECT_BY_SUBSCRIBER: &str = r"
    SELECT * FROM service_instance_links
    WHERE subscriber_instance_id = ?
    ORDER BY rowid ASC
";

/// `SQLite`-backed service instance link repository.
#[derive(Clone)]
pub struct SqliteServiceInstanceLinkRepository {
    pool: SqlitePool,
}

impl SqliteServiceInstanceLinkRepository {
    /// Create a new repository using the given connection pool.
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

impl ServiceInstanceLinkRepository for SqliteServiceInstanceLinkRepository {
    fn create(
        &self,
        link: ServiceInstanceLink,
    ) -> impl Future<Output = Result<ServiceInstanceLink, AccessLineError>> + Send {
        let pool = self.pool.clone();
        async move {
            sqlx::query(INSERT)
                .bind(link.id.as_uuid())
                .bind(link.subscriber_service_instance.as_uuid())
                .bind(link.provider_service_instance.as_uuid())
                .bind(link.created.to_rfc3339())
                .execute(&pool)
                .await
                .map_err(StorageError::from)?;

            Ok(link)
        }
    }

    fn find_by_subscriber_instance(
        &self,
        instance: InstanceId,
    ) -> impl Future<Output = Result<Vec<ServiceInstanceLink>, AccessLineError>> + Send {
        let pool = self.pool.clone();
        async move {
            let rows: Vec<Wrapper> = sqlx::query_as(SELECT_BY_SUBSCRIBER)
                .bind(instance.as_uuid())
                .fetch_all(&pool)
                .await
                .map_err(StorageError::from)?;

            Ok(rows.into_iter().map(|w| w.0).collect())
        }
    }
}
