//! Screening Service
//!
//! Backend for the video-screening workflow: invites, candidate video uploads
//! and tagging, served over GraphQL plus a multipart upload endpoint.

pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod schema;
pub mod services;

use std::sync::Arc;

use crate::config::DEFAULT_MAX_UPLOAD_BYTES;
use crate::db::VideoRepository;
use crate::services::storage::BlobStorage;

// Public re-exports
pub use config::Config;
pub use error::{AppError, Result};

/// Shared per-process state injected into every request.
#[derive(Clone)]
pub struct AppState {
    pub repo: Arc<dyn VideoRepository>,
    pub storage: Arc<dyn BlobStorage>,
    pub max_upload_bytes: usize,
}

impl AppState {
    pub fn new(repo: Arc<dyn VideoRepository>, storage: Arc<dyn BlobStorage>) -> Self {
        Self {
            repo,
            storage,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }

    pub fn with_max_upload_bytes(mut self, max_upload_bytes: usize) -> Self {
        self.max_upload_bytes = max_upload_bytes;
        self
    }
}
