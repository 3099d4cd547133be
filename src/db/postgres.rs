use std::{future::Future, time::Duration};

use sqlx::{pool::PoolConnection, postgres::PgPoolOptions, PgPool, Postgres};
use tracing::instrument;

use crate::{
    error::{AppError, AppResult},
    models::{Event, ScoredEvent},
    services::scoring,
};

use super::store::{CatalogSession, CatalogStore};

/// Creates a PostgreSQL connection pool
///
/// Waiting for a free connection is bounded by `acquire_timeout`; a request
/// that cannot get one fails instead of queueing forever.
pub async fn create_pool(
    database_url: &str,
    max_connections: u32,
    acquire_timeout: Duration,
) -> anyhow::Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(max_connections)
        .acquire_timeout(acquire_timeout)
        .connect(database_url)
        .await?;

    Ok(pool)
}

/// Applies the embedded schema migrations
pub async fn run_migrations(pool: &PgPool) -> AppResult<()> {
    sqlx::migrate!().run(pool).await?;
    tracing::info!("Database migrations applied");
    Ok(())
}

/// Catalog backed by the PostgreSQL pool
#[derive(Clone)]
pub struct PgCatalogStore {
    pool: PgPool,
    query_timeout: Duration,
}

impl PgCatalogStore {
    pub fn new(pool: PgPool, query_timeout: Duration) -> Self {
        Self {
            pool,
            query_timeout,
        }
    }
}

#[async_trait::async_trait]
impl CatalogStore for PgCatalogStore {
    async fn session(&self) -> AppResult<Box<dyn CatalogSession>> {
        let conn = self.pool.acquire().await?;
        Ok(Box::new(PgSession {
            conn,
            query_timeout: self.query_timeout,
        }))
    }
}

/// One pooled connection, returned to the pool on drop
struct PgSession {
    conn: PoolConnection<Postgres>,
    query_timeout: Duration,
}

/// Runs a query under `limit`, mapping an elapsed deadline to `AppError::Timeout`
async fn bounded<T, F>(limit: Duration, operation: &'static str, query: F) -> AppResult<T>
where
    F: Future<Output = Result<T, sqlx::Error>>,
{
    match tokio::time::timeout(limit, query).await {
        Ok(result) => result.map_err(AppError::from),
        Err(_) => {
            tracing::warn!(
                operation,
                timeout_ms = limit.as_millis() as u64,
                "Query timed out"
            );
            Err(AppError::Timeout(operation.to_string()))
        }
    }
}

#[derive(sqlx::FromRow)]
struct ScoreRow {
    #[sqlx(flatten)]
    event: Event,
    reservation_count: i64,
    loved_count: i64,
    has_activity: bool,
}

#[async_trait::async_trait]
impl CatalogSession for PgSession {
    #[instrument(skip(self), level = "debug")]
    async fn reserved_event_names(&mut self, user_id: i32) -> AppResult<Vec<String>> {
        let limit = self.query_timeout;
        let query = sqlx::query_scalar::<_, String>(
            r#"
            SELECT e.nom_evenement
            FROM reservation r
            JOIN evenement e ON e.id = r.evenement_id
            WHERE r.user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_all(&mut *self.conn);

        bounded(limit, "reserved_event_names", query).await
    }

    #[instrument(skip(self), level = "debug")]
    async fn reserved_categories(&mut self, user_id: i32) -> AppResult<Vec<String>> {
        let limit = self.query_timeout;
        let query = sqlx::query_scalar::<_, String>(
            r#"
            SELECT DISTINCT e.categorie
            FROM reservation r
            JOIN evenement e ON e.id = r.evenement_id
            WHERE r.user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_all(&mut *self.conn);

        bounded(limit, "reserved_categories", query).await
    }

    #[instrument(skip(self, categories, excluded_names), level = "debug")]
    async fn events_by_category_excluding(
        &mut self,
        categories: &[String],
        excluded_names: &[String],
    ) -> AppResult<Vec<Event>> {
        let limit = self.query_timeout;
        let query = sqlx::query_as::<_, Event>(
            r#"
            SELECT id, nom_evenement, date, nbr_place, categorie, objectif, etat, time, image, user_id
            FROM evenement
            WHERE categorie = ANY($1)
              AND NOT (nom_evenement = ANY($2))
            ORDER BY id
            "#,
        )
        .bind(categories)
        .bind(excluded_names)
        .fetch_all(&mut *self.conn);

        bounded(limit, "events_by_category_excluding", query).await
    }

    #[instrument(skip(self, candidate_ids, excluded_names), level = "debug")]
    async fn score_candidates(
        &mut self,
        candidate_ids: &[i32],
        excluded_names: &[String],
    ) -> AppResult<Vec<ScoredEvent>> {
        let limit = self.query_timeout;
        // Reservations and favorites are aggregated separately so that one
        // does not multiply the other.
        let query = sqlx::query_as::<_, ScoreRow>(
            r#"
            SELECT e.id, e.nom_evenement, e.date, e.nbr_place, e.categorie, e.objectif,
                   e.etat, e.time, e.image, e.user_id,
                   COALESCE(r.reservation_count, 0) AS reservation_count,
                   COALESCE(f.loved_count, 0) AS loved_count,
                   (r.evenement_id IS NOT NULL OR f.evenement_id IS NOT NULL) AS has_activity
            FROM evenement e
            LEFT JOIN (
                SELECT evenement_id, COUNT(*) AS reservation_count
                FROM reservation
                GROUP BY evenement_id
            ) r ON r.evenement_id = e.id
            LEFT JOIN (
                SELECT evenement_id, SUM(CASE WHEN loved THEN 1 ELSE 0 END) AS loved_count
                FROM favoris
                GROUP BY evenement_id
            ) f ON f.evenement_id = e.id
            WHERE e.id = ANY($1)
              AND NOT (e.nom_evenement = ANY($2))
            "#,
        )
        .bind(candidate_ids)
        .bind(excluded_names)
        .fetch_all(&mut *self.conn);

        let rows = bounded(limit, "score_candidates", query).await?;

        Ok(rows
            .into_iter()
            .map(|row| ScoredEvent {
                score: scoring::candidate_score(
                    row.reservation_count,
                    row.loved_count,
                    row.has_activity,
                ),
                event: row.event,
            })
            .collect())
    }

    #[instrument(skip(self), level = "debug")]
    async fn list_events(&mut self) -> AppResult<Vec<Event>> {
        let limit = self.query_timeout;
        let query = sqlx::query_as::<_, Event>(
            r#"
            SELECT id, nom_evenement, date, nbr_place, categorie, objectif, etat, time, image, user_id
            FROM evenement
            ORDER BY id
            "#,
        )
        .fetch_all(&mut *self.conn);

        bounded(limit, "list_events", query).await
    }
}
