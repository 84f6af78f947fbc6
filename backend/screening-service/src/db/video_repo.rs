/// Video repository - PostgreSQL-backed record store
///
/// Each operation is a single-row statement. Upserts use `ON CONFLICT` so
/// implicit creation never clobbers an existing url or tag set, and tag
/// mutations are applied under the row lock Postgres takes for the conflict
/// branch.
use async_trait::async_trait;
use sqlx::migrate::Migrator;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use sqlx::{PgPool, Row};
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, info};

use super::{RepoResult, VideoRepository};
use crate::config::DatabaseConfig;
use crate::models::CandidateVideoRecord;

pub static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

pub struct PgVideoRepository {
    pool: PgPool,
}

impl PgVideoRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connect using `config`, then run the embedded migrations.
    pub async fn connect(config: &DatabaseConfig) -> RepoResult<Self> {
        let mut options = PgConnectOptions::from_str(&config.url)?;
        if let Some(name) = &config.name {
            options = options.database(name);
        }

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs))
            .connect_with(options)
            .await?;

        MIGRATOR.run(&pool).await?;
        info!(
            max_connections = config.max_connections,
            "Record store migrations applied"
        );

        Ok(Self::new(pool))
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl VideoRepository for PgVideoRepository {
    async fn create_invite(&self, invite_id: &str) -> RepoResult<String> {
        sqlx::query(
            r#"
            INSERT INTO candidate_videos (invite_id)
            VALUES ($1)
            ON CONFLICT (invite_id) DO NOTHING
            "#,
        )
        .bind(invite_id)
        .execute(&self.pool)
        .await?;

        debug!(invite_id, "Invite ensured");
        Ok(invite_id.to_string())
    }

    async fn get_video(&self, invite_id: &str) -> RepoResult<CandidateVideoRecord> {
        let row = sqlx::query(
            r#"
            SELECT url, tags
            FROM candidate_videos
            WHERE invite_id = $1
            "#,
        )
        .bind(invite_id)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => Ok(CandidateVideoRecord {
                invite_id: invite_id.to_string(),
                url: row.try_get("url")?,
                tags: row.try_get("tags")?,
            }),
            None => Ok(CandidateVideoRecord::empty(invite_id)),
        }
    }

    async fn set_video_url(&self, invite_id: &str, url: &str) -> RepoResult<()> {
        sqlx::query(
            r#"
            INSERT INTO candidate_videos (invite_id, url)
            VALUES ($1, $2)
            ON CONFLICT (invite_id) DO UPDATE
            SET url = EXCLUDED.url
            "#,
        )
        .bind(invite_id)
        .bind(url)
        .execute(&self.pool)
        .await?;

        debug!(invite_id, url, "Video url set");
        Ok(())
    }

    async fn add_tag(&self, invite_id: &str, tag: &str) -> RepoResult<Vec<String>> {
        let row = sqlx::query(
            r#"
            INSERT INTO candidate_videos AS cv (invite_id, tags)
            VALUES ($1, ARRAY[$2::TEXT])
            ON CONFLICT (invite_id) DO UPDATE
            SET tags = CASE
                WHEN $2::TEXT = ANY(cv.tags) THEN cv.tags
                ELSE array_append(cv.tags, $2::TEXT)
            END
            RETURNING tags
            "#,
        )
        .bind(invite_id)
        .bind(tag)
        .fetch_one(&self.pool)
        .await?;

        debug!(invite_id, tag, "Tag added");
        Ok(row.try_get("tags")?)
    }

    async fn remove_tag(&self, invite_id: &str, tag: &str) -> RepoResult<Vec<String>> {
        let row = sqlx::query(
            r#"
            INSERT INTO candidate_videos AS cv (invite_id)
            VALUES ($1)
            ON CONFLICT (invite_id) DO UPDATE
            SET tags = array_remove(cv.tags, $2::TEXT)
            RETURNING tags
            "#,
        )
        .bind(invite_id)
        .bind(tag)
        .fetch_one(&self.pool)
        .await?;

        debug!(invite_id, tag, "Tag removed");
        Ok(row.try_get("tags")?)
    }
}
