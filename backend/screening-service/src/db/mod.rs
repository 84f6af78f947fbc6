/// Record store for candidate videos
///
/// This module provides:
/// - The `VideoRepository` trait every backend implements
/// - An in-process backend (`memory_repo`) and a PostgreSQL backend (`video_repo`)
/// - Backend selection from configuration
///
/// Every mutating call performs get-or-create as a single atomic step. A read
/// never creates a record; unknown invites come back as the zero-value record.
pub mod memory_repo;
pub mod video_repo;

use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;
use tracing::info;

use crate::config::{RepoBackend, RepoConfig};
use crate::models::CandidateVideoRecord;

pub use memory_repo::MemoryVideoRepository;
pub use video_repo::PgVideoRepository;

/// Result type alias for record store operations.
pub type RepoResult<T> = std::result::Result<T, RepoError>;

/// Errors raised by a record store backend.
///
/// Absence of a record is not an error.
#[derive(Error, Debug)]
pub enum RepoError {
    /// Backing store unreachable or failed to execute the operation
    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),
}

impl From<sqlx::Error> for RepoError {
    fn from(err: sqlx::Error) -> Self {
        RepoError::StoreUnavailable(err.to_string())
    }
}

impl From<sqlx::migrate::MigrateError> for RepoError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        RepoError::StoreUnavailable(err.to_string())
    }
}

/// Candidate video record store.
#[async_trait]
pub trait VideoRepository: Send + Sync {
    /// Ensure a record exists for `invite_id`. An existing record is left untouched.
    async fn create_invite(&self, invite_id: &str) -> RepoResult<String>;

    /// Current record, or the zero-value record when none exists.
    async fn get_video(&self, invite_id: &str) -> RepoResult<CandidateVideoRecord>;

    /// Create the record if needed, then replace its url.
    async fn set_video_url(&self, invite_id: &str, url: &str) -> RepoResult<()>;

    /// Create the record if needed, insert `tag` if missing, return the tag set.
    async fn add_tag(&self, invite_id: &str, tag: &str) -> RepoResult<Vec<String>>;

    /// Create the record if needed, remove `tag` if present, return the tag set.
    async fn remove_tag(&self, invite_id: &str, tag: &str) -> RepoResult<Vec<String>>;
}

/// Build the record store selected by `REPO_BACKEND`.
pub async fn build_repository(config: &RepoConfig) -> RepoResult<Arc<dyn VideoRepository>> {
    match config.backend {
        RepoBackend::Memory => {
            info!("Using in-memory record store");
            Ok(Arc::new(MemoryVideoRepository::new()))
        }
        RepoBackend::Durable => {
            let database = config.database.as_ref().ok_or_else(|| {
                RepoError::StoreUnavailable("durable backend requires DATABASE_URL".to_string())
            })?;
            let repo = PgVideoRepository::connect(database).await?;
            info!("Using PostgreSQL record store");
            Ok(Arc::new(repo))
        }
    }
}
