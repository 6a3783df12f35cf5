//! `SQLite` implementation of [`SubscriberRepository`].
//!
//! Tags are stored as nullable integers. Two partial unique indexes reject a
//! live subscriber reusing a C-tag on its ONU device or a `(c_tag, s_tag)`
//! pair; such a write fails with `TagConflict`.

use std::future::Future;
use std::str::FromStr;

use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, Row, SqlitePool};

use accessline_app::ports::SubscriberRepository;
use accessline_domain::error::AccessLineError;
use accessline_domain::id::{InstanceId, ServiceId};
use accessline_domain::subscriber::{Subscriber, SubscriberStatus};
use accessline_domain::time::parse_rfc3339;

use crate::error::{StorageError, decode, subscriber_write_error};

/// Wrapper for converting database rows into domain [`Subscriber`].
struct Wrapper(Subscriber);

impl Wrapper {
    fn maybe(value: Option<Self>) -> Option<Subscriber> {
        value.map(|w| w.0)
    }

    fn many(rows: Vec<Self>) -> Vec<Subscriber> {
        rows.into_iter().map(|w| w.0).collect()
    }
}

fn tag(value: Option<i64>) -> Result<Option<u16>, sqlx::Error> {
    value.map(u16::try_from).transpose().map_err(decode)
}

impl<'r> FromRow<'r, SqliteRow> for Wrapper {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        let id: uuid::Uuid = row.try_get("id")?;
        let owner: uuid::Uuid = row.try_get("owner_id")?;
        let status: String = row.try_get("status")?;
        let created: String = row.try_get("created")?;
        let updated: String = row.try_get("updated")?;

        Ok(Self(Subscriber {
            id: InstanceId::from_uuid(id),
            name: row.try_get("name")?,
            onu_device: row.try_get("onu_device")?,
            c_tag: tag(row.try_get("c_tag")?)?,
            s_tag: tag(row.try_get("s_tag")?)?,
            mac_address: row.try_get("mac_address")?,
            service_specific_id: row.try_get("service_specific_id")?,
            status: SubscriberStatus::from_str(&status).map_err(decode)?,
            owner: ServiceId::from_uuid(owner),
            creator: row.try_get("creator")?,
            caller: None,
            deleted: row.try_get("deleted")?,
            created: parse_rfc3339(&created).map_err(decode)?,
            updated: parse_rfc3339(&updated).map_err(decode)?,
        }))
    }
}

const INSERT: &str = r"
    INSERT INTO subscribers (
        id, name, onu_device, c_tag, s_tag, mac_address, service_specific_id,
        status, owner_id, creator, deleted, created, updated
    )
    VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
";
const UPDATE: &str = r"
    UPDATE subscribers SET
        name = ?, onu_device = ?, c_tag = ?, s_tag = ?, mac_address = ?,
        service_specific_id = ?, status = ?, owner_id = ?, creator = ?,
        deleted = ?, updated = ?
    WHERE id = ?
";
const SELECT_BY_ID: &str = "SELECT * FROM subscribers WHERE id = ?";
const SELECT_ALL: &str = "SELECT * FROM subscribers ORDER BY created ASC";
const SELECT_BY_ONU_DEVICE: &str =
    "SELECT * FROM subscribers WHERE onu_device = ? AND deleted = 0";
const SELECT_BY_TAGS: &str =
    "SELECT * FROM subscribers WHERE c_tag = ? AND s_tag = ? AND deleted = 0";
const SELECT_BY_SERVICE_SPECIFIC_ID: &str =
    "SELECT * FROM subscribers WHERE service_specific_id = ? AND deleted = 0";

/// `SQLite`-backed subscriber repository.
#[derive(Clone)]
pub struct SqliteSubscriberRepository {
    pool: SqlitePool,
}

impl SqliteSubscriberRepository {
    /// Create a new repository using the given connection pool.
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

impl SubscriberRepository for SqliteSubscriberRepository {
    fn create(
        &self,
        subscriber: Subscriber,
    ) -> impl Future<Output = Result<Subscriber, AccessLineError>> + Send {
        let pool = self.pool.clone();
        async move {
            sqlx::query(INSERT)
                .bind(subscriber.id.as_uuid())
                .bind(&subscriber.name)
                .bind(&subscriber.onu_device)
                .bind(subscriber.c_tag.map(i64::from))
                .bind(subscriber.s_tag.map(i64::from))
                .bind(&subscriber.mac_address)
                .bind(&subscriber.service_specific_id)
                .bind(subscriber.status.as_str())
                .bind(subscriber.owner.as_uuid())
                .bind(&subscriber.creator)
                .bind(subscriber.deleted)
                .bind(subscriber.created.to_rfc3339())
                .bind(subscriber.updated.to_rfc3339())
                .execute(&pool)
                .await
                .map_err(subscriber_write_error)?;

            Ok(subscriber)
        }
    }

    fn get_by_id(
        &self,
        id: InstanceId,
    ) -> impl Future<Output = Result<Option<Subscriber>, AccessLineError>> + Send {
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

    fn get_all(&self) -> impl Future<Output = Result<Vec<Subscriber>, AccessLineError>> + Send {
        let pool = self.pool.clone();
        async move {
            let rows: Vec<Wrapper> = sqlx::query_as(SELECT_ALL)
                .fetch_all(&pool)
                .await
                .map_err(StorageError::from)?;

            Ok(Wrapper::many(rows))
        }
    }

    fn update(
        &self,
        subscriber: Subscriber,
    ) -> impl Future<Output = Result<Subscriber, AccessLineError>> + Send {
        let pool = self.pool.clone();
        async move {
            sqlx::query(UPDATE)
                .bind(&subscriber.name)
                .bind(&subscriber.onu_device)
                .bind(subscriber.c_tag.map(i64::from))
                .bind(subscriber.s_tag.map(i64::from))
                .bind(&subscriber.mac_address)
                .bind(&subscriber.service_specific_id)
                .bind(subscriber.status.as_str())
                .bind(subscriber.owner.as_uuid())
                .bind(&subscriber.creator)
                .bind(subscriber.deleted)
                .bind(subscriber.updated.to_rfc3339())
                .bind(subscriber.id.as_uuid())
                .execute(&pool)
                .await
                .map_err(subscriber_write_error)?;

            Ok(subscriber)
        }
    }

    fn find_by_onu_device(
        &self,
        onu_device: &str,
    ) -> impl Future<Output = Result<Vec<Subscriber>, AccessLineError>> + Send {
        let onu_device = onu_device.to_string();
        let pool = self.pool.clone();
        async move {
            let rows: Vec<Wrapper> = sqlx::query_as(SELECT_BY_ONU_DEVICE)
                .bind(onu_device)
                .fetch_all(&pool)
                .await
                .map_err(StorageError::from)?;

            Ok(Wrapper::many(rows))
        }
    }

    fn find_by_tags(
        &self,
        c_tag: u16,
        s_tag: u16,
    ) -> impl Future<Output = Result<Vec<Subscriber>, AccessLineError>> + Send {
        let pool = self.pool.clone();
        async move {
            let rows: Vec<Wrapper> = sqlx::query_as(SELECT_BY_TAGS)
                .bind(i64::from(c_tag))
                .bind(i64::from(s_tag))
                .fetch_all(&pool)
                .await
                .map_err(StorageError::from)?;

            Ok(Wrapper::many(rows))
        }
    }

    fn find_by_service_specific_id(
        &self,
        value: &str,
    ) -> impl Future<Output = Result<Vec<Subscriber>, AccessLineError>> + Send {
        let value = value.to_string();
        let pool = self.pool.clone();
        async move {
            let rows: Vec<Wrapper> = sqlx::query_as(SELECT_BY_SERVICE_SPECIFIC_ID)
                .bind(value)
                .fetch_all(&pool)
                .await
                .map_err(StorageError::from)?;

            Ok(Wrapper::many(rows))
        }
    }
}
