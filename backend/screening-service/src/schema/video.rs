//! Candidate video schema

use async_graphql::{Context, ErrorExtensions, Object, Result as GraphQLResult, SimpleObject};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::db::VideoRepository;
use crate::models::CandidateVideoRecord;

#[derive(SimpleObject, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateVideo {
    pub invite_id: String,
    pub url: Option<String>,
    pub tags: Vec<String>,
}

impl From<CandidateVideoRecord> for CandidateVideo {
    fn from(record: CandidateVideoRecord) -> Self {
        CandidateVideo {
            invite_id: record.invite_id,
            url: record.url,
            tags: record.tags,
        }
    }
}

fn repository<'a>(ctx: &Context<'a>) -> GraphQLResult<&'a Arc<dyn VideoRepository>> {
    ctx.data::<Arc<dyn VideoRepository>>()
        .map_err(|_| "Record store not available".into())
}

#[derive(Default)]
pub struct VideoQuery;

#[Object(name = "Query")]
impl VideoQuery {
    /// Current state of an invite. Unknown invites resolve to an empty record.
    async fn video(&self, ctx: &Context<'_>, invite_id: String) -> GraphQLResult<CandidateVideo> {
        let repo = repository(ctx)?;
        let record = repo.get_video(&invite_id).await.map_err(|e| e.extend())?;
        Ok(record.into())
    }
}

#[derive(Default)]
pub struct VideoMutation;

#[Object(name = "Mutation")]
impl VideoMutation {
    async fn create_invite(&self, ctx: &Context<'_>, invite_id: String) -> GraphQLResult<String> {
        let repo = repository(ctx)?;
        let id = repo.create_invite(&invite_id).await.map_err(|e| e.extend())?;
        Ok(id)
    }

    /// Adds `tag` unless present and returns the updated record.
    async fn add_tag(
        &self,
        ctx: &Context<'_>,
        invite_id: String,
        tag: String,
    ) -> GraphQLResult<CandidateVideo> {
        let repo = repository(ctx)?;
        let tags = repo.add_tag(&invite_id, &tag).await.map_err(|e| e.extend())?;
        let record = repo.get_video(&invite_id).await.map_err(|e| e.extend())?;

        Ok(CandidateVideo {
            invite_id: record.invite_id,
            url: record.url,
            tags,
        })
    }

    async fn remove_tag(
        &self,
        ctx: &Context<'_>,
        invite_id: String,
        tag: String,
    ) -> GraphQLResult<CandidateVideo> {
        let repo = repository(ctx)?;
        let tags = repo.remove_tag(&invite_id, &tag).await.map_err(|e| e.extend())?;
        let record = repo.get_video(&invite_id).await.map_err(|e| e.extend())?;

        Ok(CandidateVideo {
            invite_id: record.invite_id,
            url: record.url,
            tags,
        })
    }
}
