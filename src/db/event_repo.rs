//! Event repository implementation for eventline
//!
//! PostgreSQL storage for canonical events. Slug uniqueness is enforced by the
//! `events_slug_key` constraint, so two concurrent writers deriving the same
//! slug cannot both succeed.

use async_trait::async_trait;
use sqlx::Row;
use tracing::Instrument;
use uuid::Uuid;

use crate::{
    db::{
        repository::{
            execute_with_retry, PersistRepository, Repository, RepositoryResult, RetryConfig,
        },
        DbPool,
    },
    store_span,
    models::event::{Event, EventKey},
};

/// Name of the unique constraint on `events.slug`
pub const EVENT_SLUG_CONSTRAINT: &str = "events_slug_key";

/// Event repository trait
#[async_trait]
pub trait EventRepository: Repository<Entity = Event, Id = Uuid> + PersistRepository {
    /// Find an event by its slug
    async fn find_by_slug(&self, slug: &str) -> RepositoryResult<Option<Event>>;

    /// Find an event by id or slug
    async fn find_by_key(&self, key: &EventKey) -> RepositoryResult<Option<Event>> {
        match key {
            EventKey::Id(id) => self.find_by_id(*id).await,
            EventKey::Slug(slug) => self.find_by_slug(slug).await,
        }
    }

    /// Check whether a slug is used by an event other than `excluding`
    async fn slug_taken(&self, slug: &str, excluding: Option<Uuid>) -> RepositoryResult<bool>;

    /// List events ordered by date and time
    async fn list(&self, limit: Option<i64>, offset: Option<i64>) -> RepositoryResult<Vec<Event>>;
}

/// PostgreSQL implementation of EventRepository
pub struct PgEventRepository {
    pool: DbPool,
    retry_config: RetryConfig,
}

impl PgEventRepository {
    /// Create a new PostgreSQL event repository
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

    /// Convert a database row to Event
    fn row_to_event(row: &sqlx::postgres::PgRow) -> RepositoryResult<Event> {
        Ok(Event {
            id: row.try_get("id")?,
            title: row.try_get("title")?,
            slug: row.try_get("slug")?,
            description: row.try_get("description")?,
            overview: row.try_get("overview")?,
            image: row.try_get("image")?,
            venue: row.try_get("venue")?,
            location: row.try_get("location")?,
            date: row.try_get("event_date")?,
            time: row.try_get("event_time")?,
            mode: row.try_get("mode")?,
            audience: row.try_get("audience")?,
            agenda: row.try_get("agenda")?,
            organizer: row.try_get("organizer")?,
            tags: row.try_get("tags")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

#[async_trait]
impl Repository for PgEventRepository {
    type Entity = Event;
    type Id = Uuid;

    async fn find_by_id(&self, id: Uuid) -> RepositoryResult<Option<Event>> {
        let pool = self.pool.clone();

        execute_with_retry(&self.retry_config, || {
            let pool = pool.clone();
            Box::pin(async move {
                let result = sqlx::query(
                    r#"
                    SELECT id, title, slug, description, overview, image, venue, location,
                           event_date, event_time, mode, audience, agenda, organizer, tags,
                           created_at, updated_at
                    FROM events
                    WHERE id = $1
                    "#,
                )
                .bind(id)
                .fetch_optional(&pool)
                .await?;

                result.as_ref().map(Self::row_to_event).transpose()
            })
        })
        .instrument(store_span!("events", "find_by_id"))
        .await
    }

    async fn exists(&self, id: Uuid) -> RepositoryResult<bool> {
        let pool = self.pool.clone();

        execute_with_retry(&self.retry_config, || {
            let pool = pool.clone();
            Box::pin(async move {
                let result = sqlx::query_scalar::<_, bool>(
                    "SELECT EXISTS(SELECT 1 FROM events WHERE id = $1)",
                )
                .bind(id)
                .fetch_one(&pool)
                .await?;

                Ok(result)
            })
        })
        .instrument(store_span!("events", "exists"))
        .await
    }

    async fn delete(&self, id: Uuid) -> RepositoryResult<bool> {
        let pool = self.pool.clone();

        execute_with_retry(&self.retry_config, || {
            let pool = pool.clone();
            Box::pin(async move {
                let result = sqlx::query("DELETE FROM events WHERE id = $1")
                    .bind(id)
                    .execute(&pool)
                    .await?;

                Ok(result.rows_affected() > 0)
            })
        })
        .instrument(store_span!("events", "delete"))
        .await
    }

    async fn count(&self) -> RepositoryResult<i64> {
        let pool = self.pool.clone();

        execute_with_retry(&self.retry_config, || {
            let pool = pool.clone();
            Box::pin(async move {
                let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM events")
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
            .map_err(|e| {
                crate::db::RepositoryError::Connection(format!("Health check failed: {}", e))
            })
    }
}

#[async_trait]
impl PersistRepository for PgEventRepository {
    async fn persist(&self, entity: &Event) -> RepositoryResult<Event> {
        let pool = self.pool.clone();
        let entity = entity.clone();

        execute_with_retry(&self.retry_config, || {
            let pool = pool.clone();
            let entity = entity.clone();
            Box::pin(async move {
                let row = sqlx::query(
                    r#"
                    INSERT INTO events (
                        id, title, slug, description, overview, image, venue, location,
                        event_date, event_time, mode, audience, agenda, organizer, tags,
                        created_at, updated_at
                    ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17)
                    ON CONFLICT (id) DO UPDATE SET
                        title = EXCLUDED.title,
                        slug = EXCLUDED.slug,
                        description = EXCLUDED.description,
                        overview = EXCLUDED.overview,
                        image = EXCLUDED.image,
                        venue = EXCLUDED.venue,
                        location = EXCLUDED.location,
                        event_date = EXCLUDED.event_date,
                        event_time = EXCLUDED.event_time,
                        mode = EXCLUDED.mode,
                        audience = EXCLUDED.audience,
                        agenda = EXCLUDED.agenda,
                        organizer = EXCLUDED.organizer,
                        tags = EXCLUDED.tags,
                        updated_at = EXCLUDED.updated_at
                    RETURNING id, title, slug, description, overview, image, venue, location,
                              event_date, event_time, mode, audience, agenda, organizer, tags,
                              created_at, updated_at
                    "#,
                )
                .bind(entity.id)
                .bind(&entity.title)
                .bind(&entity.slug)
                .bind(&entity.description)
                .bind(&entity.overview)
                .bind(&entity.image)
                .bind(&entity.venue)
                .bind(&entity.location)
                .bind(&entity.date)
                .bind(&entity.time)
                .bind(&entity.mode)
                .bind(&entity.audience)
                .bind(&entity.agenda)
                .bind(&entity.organizer)
                .bind(&entity.tags)
                .bind(entity.created_at)
                .bind(entity.updated_at)
                .fetch_one(&pool)
                .await?;

                Self::row_to_event(&row)
            })
        })
        .instrument(store_span!("events", "persist"))
        .await
    }
}

#[async_trait]
impl EventRepository for PgEventRepository {
    async fn find_by_slug(&self, slug: &str) -> RepositoryResult<Option<Event>> {
        let pool = self.pool.clone();
        let slug = slug.to_string();

        execute_with_retry(&self.retry_config, || {
            let pool = pool.clone();
            let slug = slug.clone();
            Box::pin(async move {
                let result = sqlx::query(
                    r#"
                    SELECT id, title, slug, description, overview, image, venue, location,
                           event_date, event_time, mode, audience, agenda, organizer, tags,
                           created_at, updated_at
                    FROM events
                    WHERE slug = $1
                    "#,
                )
                .bind(slug)
                .fetch_optional(&pool)
                .await?;

                result.as_ref().map(Self::row_to_event).transpose()
            })
        })
        .instrument(store_span!("events", "find_by_slug"))
        .await
    }

    async fn slug_taken(&self, slug: &str, excluding: Option<Uuid>) -> RepositoryResult<bool> {
        let pool = self.pool.clone();
        let slug = slug.to_string();

        execute_with_retry(&self.retry_config, || {
            let pool = pool.clone();
            let slug = slug.clone();
            Box::pin(async move {
                let taken = sqlx::query_scalar::<_, bool>(
                    r#"
                    SELECT EXISTS(
                        SELECT 1 FROM events
                        WHERE slug = $1 AND ($2::uuid IS NULL OR id <> $2)
                    )
                    "#,
                )
                .bind(slug)
                .bind(excluding)
                .fetch_one(&pool)
                .await?;

                Ok(taken)
            })
        })
        .instrument(store_span!("events", "slug_taken"))
        .await
    }

    async fn list(&self, limit: Option<i64>, offset: Option<i64>) -> RepositoryResult<Vec<Event>> {
        let pool = self.pool.clone();

        execute_with_retry(&self.retry_config, || {
            let pool = pool.clone();
            Box::pin(async move {
                let rows = sqlx::query(
                    r#"
                    SELECT id, title, slug, description, overview, image, venue, location,
                           event_date, event_time, mode, audience, agenda, organizer, tags,
                           created_at, updated_at
                    FROM events
                    ORDER BY event_date ASC, event_time ASC, created_at ASC
                    LIMIT $1 OFFSET $2
                    "#,
                )
                .bind(limit)
                .bind(offset.unwrap_or(0))
                .fetch_all(&pool)
                .await?;

                rows.iter().map(Self::row_to_event).collect()
            })
        })
        .instrument(store_span!("events", "list"))
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retry_config_creation() {
        let config = RetryConfig::new(5).with_initial_backoff(200).with_max_backoff(5000);

        assert_eq!(config.max_retries, 5);
        assert_eq!(config.initial_backoff_ms, 200);
        assert_eq!(config.max_backoff_ms, 5000);
    }

    #[test]
    fn test_slug_constraint_name_matches_migration() {
        let migration = include_str!("../../migrations/20240301000000_create_events.sql");
        assert!(migration.contains(EVENT_SLUG_CONSTRAINT));
    }
}
