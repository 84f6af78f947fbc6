//! GraphQL schema for invites and candidate videos

pub mod video;

use async_graphql::{EmptySubscription, ErrorExtensions, Schema};
use std::sync::Arc;

use crate::db::{RepoError, VideoRepository};

/// GraphQL App Schema type
pub type AppSchema = Schema<video::VideoQuery, video::VideoMutation, EmptySubscription>;

/// Build the schema around the record store chosen at startup
pub fn build_schema(repo: Arc<dyn VideoRepository>) -> AppSchema {
    Schema::build(
        video::VideoQuery::default(),
        video::VideoMutation::default(),
        EmptySubscription,
    )
    .data(repo)
    .finish()
}

impl ErrorExtensions for RepoError {
    fn extend(&self) -> async_graphql::Error {
        async_graphql::Error::new(self.to_string()).extend_with(|_, e| match self {
            RepoError::StoreUnavailable(_) => e.set("code", "STORE_UNAVAILABLE"),
        })
    }
}
