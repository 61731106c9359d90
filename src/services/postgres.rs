use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{PgPool, Row};
use std::time::Duration;
use thiserror::Error;
use uuid::Uuid;

use crate::models::{Lead, LeadStatus, MatchCandidate, NewLead};

/// Errors that can occur when interacting with PostgreSQL
#[derive(Debug, Error)]
pub enum PostgresError {
    #[error("SQLx error: {0}")]
    SqlxError(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    MigrateError(#[from] sqlx::migrate::MigrateError),

    #[error("Not found: {0}")]
    NotFound(String),
}

/// PostgreSQL client for advisor listings and leads
pub struct PostgresClient {
    pool: PgPool,
}

/// Published listings, those in the wanted state first
///
/// `$1` is an upper-case state code; stored states are trimmed and uppercased
/// before comparing so mixed-case rows still sort first.
const FETCH_CANDIDATES_QUERY: &str = r#"
    SELECT id, advisor_type, specialty_slugs, suburb, state, accepting_status,
           response_time_hours, verification_level, rating, response_rate,
           profile_completeness_score
    FROM listings
    WHERE is_published = TRUE
    ORDER BY (upper(trim(state)) = $1) DESC NULLS LAST,
             profile_completeness_score DESC,
             id
    LIMIT $2
"#;

impl PostgresClient {
    /// Create a new PostgreSQL client from a connection string
    pub async fn new(
        database_url: &str,
        max_connections: u32,
        min_connections: u32,
        acquire_timeout: Duration,
        idle_timeout: Duration,
    ) -> Result<Self, PostgresError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .min_connections(min_connections)
            .acquire_timeout(acquire_timeout)
            .idle_timeout(idle_timeout)
            .test_before_acquire(true)
            .connect(database_url)
            .await?;

        // Run migrations on startup
        sqlx::migrate!("./migrations").run(&pool).await?;

        Ok(Self { pool })
    }

    /// Create a new PostgreSQL client from settings
    pub async fn from_settings(
        url: &str,
        max_connections: Option<u32>,
        min_connections: Option<u32>,
        acquire_timeout_secs: Option<u64>,
        idle_timeout_secs: Option<u64>,
    ) -> Result<Self, PostgresError> {
        tracing::info!("Connecting to PostgreSQL");

        Self::new(
            url,
            max_connections.unwrap_or(10),
            min_connections.unwrap_or(1),
            Duration::from_secs(acquire_timeout_secs.unwrap_or(5)),
            Duration::from_secs(idle_timeout_secs.unwrap_or(600)),
        )
        .await
    }

    /// Fetch published listings to score for a search
    ///
    /// Listings in `state` come first so a capped pool still covers the
    /// consumer's area; the rest are ordered by profile completeness.
    pub async fn fetch_candidates(
        &self,
        state: Option<&str>,
        limit: u32,
    ) -> Result<Vec<MatchCandidate>, PostgresError> {
        let rows = sqlx::query(FETCH_CANDIDATES_QUERY)
            .bind(state)
            .bind(i64::from(limit))
            .fetch_all(&self.pool)
            .await?;

        let candidates = rows
            .iter()
            .map(candidate_from_row)
            .collect::<Result<Vec<_>, sqlx::Error>>()?;

        tracing::debug!("Fetched {} candidate listings (state: {:?})", candidates.len(), state);

        Ok(candidates)
    }

    /// Create a lead in `new` for a published listing
    ///
    /// The advisor is taken from the listing so consumers cannot address a
    /// lead to someone else.
    pub async fn create_lead(&self, lead: &NewLead) -> Result<Lead, PostgresError> {
        let query = r#"
            INSERT INTO leads (id, listing_id, advisor_id, consumer_name, consumer_email,
                               consumer_phone, message, status)
            SELECT $1, l.id, l.advisor_id, $3, $4, $5, $6, 'new'
            FROM listings l
            WHERE l.id = $2 AND l.is_published = TRUE
            RETURNING id, listing_id, advisor_id, consumer_name, consumer_email,
                      consumer_phone, message, status, created_at, updated_at
        "#;

        let row = sqlx::query(query)
            .bind(Uuid::new_v4())
            .bind(lead.listing_id)
            .bind(&lead.consumer_name)
            .bind(&lead.consumer_email)
            .bind(&lead.consumer_phone)
            .bind(&lead.message)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| PostgresError::NotFound(format!("listing {}", lead.listing_id)))?;

        let created = lead_from_row(&row)?;

        tracing::info!("Created lead {} for listing {}", created.id, created.listing_id);

        Ok(created)
    }

    pub async fn get_lead(&self, lead_id: Uuid) -> Result<Lead, PostgresError> {
        let query = r#"
            SELECT id, listing_id, advisor_id, consumer_name, consumer_email,
                   consumer_phone, message, status, created_at, updated_at
            FROM leads
            WHERE id = $1
        "#;

        let row = sqlx::query(query)
            .bind(lead_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| PostgresError::NotFound(format!("lead {}", lead_id)))?;

        Ok(lead_from_row(&row)?)
    }

    /// Move a lead from `from` to `to` if it is still in `from`
    ///
    /// Callers validate the transition first. Returns `None` when the lead's
    /// status changed underneath us; nothing is written in that case. The
    /// status change and its history row commit together.
    pub async fn update_lead_status(
        &self,
        lead_id: Uuid,
        from: LeadStatus,
        to: LeadStatus,
        changed_by: Uuid,
    ) -> Result<Option<Lead>, PostgresError> {
        let mut tx = self.pool.begin().await?;

        let update = r#"
            UPDATE leads
            SET status = $3, updated_at = NOW()
            WHERE id = $1 AND status = $2
            RETURNING id, listing_id, advisor_id, consumer_name, consumer_email,
                      consumer_phone, message, status, created_at, updated_at
        "#;

        let Some(row) = sqlx::query(update)
            .bind(lead_id)
            .bind(from)
            .bind(to)
            .fetch_optional(&mut *tx)
            .await?
        else {
            tx.rollback().await?;
            return Ok(None);
        };

        let history = r#"
            INSERT INTO lead_status_events (lead_id, from_status, to_status, changed_by)
            VALUES ($1, $2, $3, $4)
        "#;

        sqlx::query(history)
            .bind(lead_id)
            .bind(from)
            .bind(to)
            .bind(changed_by)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        tracing::info!("Lead {} moved {} -> {}", lead_id, from, to);

        Ok(Some(lead_from_row(&row)?))
    }

    /// Health check for the database connection
    pub async fn health_check(&self) -> Result<bool, PostgresError> {
        sqlx::query("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map(|_| true)
            .map_err(Into::into)
    }
}

fn candidate_from_row(row: &PgRow) -> Result<MatchCandidate, sqlx::Error> {
    Ok(MatchCandidate {
        listing_id: row.try_get("id")?,
        advisor_type: row.try_get("advisor_type")?,
        specialty_slugs: row.try_get("specialty_slugs")?,
        suburb: row.try_get("suburb")?,
        state: row.try_get("state")?,
        accepting_status: row.try_get("accepting_status")?,
        response_time_hours: row.try_get("response_time_hours")?,
        verification_level: row.try_get("verification_level")?,
        rating: row.try_get("rating")?,
        response_rate: row.try_get("response_rate")?,
        profile_completeness_score: row.try_get("profile_completeness_score")?,
    })
}

fn lead_from_row(row: &PgRow) -> Result<Lead, sqlx::Error> {
    Ok(Lead {
        id: row.try_get("id")?,
        listing_id: row.try_get("listing_id")?,
        advisor_id: row.try_get("advisor_id")?,
        consumer_name: row.try_get("consumer_name")?,
        consumer_email: row.try_get("consumer_email")?,
        consumer_phone: row.try_get("consumer_phone")?,
        message: row.try_get("message")?,
        status: row.try_get("status")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}
