//! Booking repository implementation for eventline
//!
//! Bookings reference events by id without a foreign key; the reference is
//! checked by the booking pipeline before writing. Lookups by event go through
//! the `idx_bookings_event_id` index.

use async_trait::async_trait;
use sqlx::Row;
use tracing::Instrument;
use uuid::Uuid;

use crate::{
    db::{
        repository::{
            execute_with_retry, PersistRepository, Repository, RepositoryError, RepositoryResult,
            RetryConfig,
        },
        DbPool,
    },
    store_span,
    models::booking::Booking,
};

/// Booking repository trait
#[async_trait]
pub trait BookingRepository: Repository<Entity = Booking, Id = Uuid> + PersistRepository {
    /// Find bookings for an event, oldest first
    async fn find_by_event(
        &self,
        event_id: Uuid,
        limit: Option<i64>,
        offset: Option<i64>,
    ) -> RepositoryResult<Vec<Booking>>;

    /// Count bookings for an event
    async fn count_by_event(&self, event_id: Uuid) -> RepositoryResult<i64>;
}

/// PostgreSQL implementation of BookingRepository
pub struct PgBookingRepository {
    pool: DbPool,
    retry_config: RetryConfig,
}

impl PgBookingRepository {
    /// Create a new PostgreSQL booking repository
    pub fn new(pool: DbPool) -> Self {
        Self {
            pool,
            retry_config: RetryConfig::default(),
        }
    }

    /// Create with custom retry configuration
    pub fn with_retry_config(pool: DbPool, retry_config: RetryConfig) -> Self {
        Self { pool, retry_config }
    }

    fn row_to_booking(row: &sqlx::postgres::PgRow) -> RepositoryResult<Booking> {
        Ok(Booking {
            id: row.try_get("id")?,
            event_id: row.try_get("event_id")?,
            email: row.try_get("email")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

#[async_trait]
impl Repository for PgBookingRepository {
    type Entity = Booking;
    type Id = Uuid;

    async fn find_by_id(&self, id: Uuid) -> RepositoryResult<Option<Booking>> {
        let pool = self.pool.clone();

        execute_with_retry(&self.retry_config, || {
            let pool = pool.clone();
            Box::pin(async move {
                let result = sqlx::query(
                    r#"
                    SELECT id, event_id, email, created_at, updated_at
                    FROM bookings
                    WHERE id = $1
                    "#,
                )
                .bind(id)
                .fetch_optional(&pool)
                .await?;

                result.as_ref().map(Self::row_to_booking).transpose()
            })
        })
        .instrument(store_span!("bookings", "find_by_id"))
        .await
    }

    async fn exists(&self, id: Uuid) -> RepositoryResult<bool> {
        let pool = self.pool.clone();

        execute_with_retry(&self.retry_config, || {
            let pool = pool.clone();
            Box::pin(async move {
                let result = sqlx::query_scalar::<_, bool>(
                    "SELECT EXISTS(SELECT 1 FROM bookings WHERE id = $1)",
                )
                .bind(id)
                .fetch_one(&pool)
                .await?;

                Ok(result)
            })
        })
        .await
    }

    async fn delete(&self, id: Uuid) -> RepositoryResult<bool> {
        let pool = self.pool.clone();

        execute_with_retry(&self.retry_config, || {
            let pool = pool.clone();
            Box::pin(async move {
                let result = sqlx::query("DELETE FROM bookings WHERE id = $1")
                    .bind(id)
                    .execute(&pool)
                    .await?;

                Ok(result.rows_affected() > 0)
            })
        })
        .instrument(store_span!("bookings", "delete"))
        .await
    }

    async fn count(&self) -> RepositoryResult<i64> {
        let pool = self.pool.clone();

        execute_with_retry(&self.retry_config, || {
            let pool = pool.clone();
            Box::pin(async move {
                let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM bookings")
                    .fetch_one(&pool)
                    .await?;

                Ok(count)
            })
        })
        .await
    }

    async fn health_check(&self) -> RepositoryResult<()> {
        sqlx::query("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map(|_| ())
            .map_err(|e| RepositoryError::Connection(format!("Health check failed: {}", e)))
    }
}

#[async_trait]
impl PersistRepository for PgBookingRepository {
    async fn persist(&self, entity: &Booking) -> RepositoryResult<Booking> {
        let pool = self.pool.clone();
        let entity = entity.clone();

        execute_with_retry(&self.retry_config, || {
            let pool = pool.clone();
            let entity = entity.clone();
            Box::pin(async move {
                let row = sqlx::query(
                    r#"
                    INSERT INTO bookings (id, event_id, email, created_at, updated_at)
                    VALUES ($1, $2, $3, $4, $5)
                    ON CONFLICT (id) DO UPDATE SET
                        event_id = EXCLUDED.event_id,
                        email = EXCLUDED.email,
                        updated_at = EXCLUDED.updated_at
                    RETURNING id, event_id, email, created_at, updated_at
                    "#,
                )
                .bind(entity.id)
                .bind(entity.event_id)
                .bind(&entity.email)
                .bind(entity.created_at)
                .bind(entity.updated_at)
                .fetch_one(&pool)
                .await?;

                Self::row_to_booking(&row)
            })
        })
        .instrument(store_span!("bookings", "persist"))
        .await
    }
}

#[async_trait]
impl BookingRepository for PgBookingRepository {
    async fn find_by_event(
        &self,
        event_id: Uuid,
        limit: Option<i64>,
        offset: Option<i64>,
    ) -> RepositoryResult<Vec<Booking>> {
        let pool = self.pool.clone();

        execute_with_retry(&self.retry_config, || {
            let pool = pool.clone();
            Box::pin(async move {
                let rows = sqlx::query(
                    r#"
                    SELECT id, event_id, email, created_at, updated_at
                    FROM bookings
                    WHERE event_id = $1
                    ORDER BY created_at ASC
                    LIMIT $2 OFFSET $3
                    "#,
                )
                .bind(event_id)
                .bind(limit)
                .bind(offset.unwrap_or(0))
                .fetch_all(&pool)
                .await?;

                rows.iter().map(Self::row_to_booking).collect()
            })
        })
        .instrument(store_span!("bookings", "find_by_event"))
        .await
    }

    async fn count_by_event(&self, event_id: Uuid) -> RepositoryResult<i64> {
        let pool = self.pool.clone();

        execute_with_retry(&self.retry_config, || {
            let pool = pool.clone();
            Box::pin(async move {
                let count = sqlx::query_scalar::<_, i64>(
                    "SELECT COUNT(*) FROM bookings WHERE event_id = $1",
                )
                .bind(event_id)
                .fetch_one(&pool)
                .await?;

                Ok(count)
            })
        })
        .await
    }
}
