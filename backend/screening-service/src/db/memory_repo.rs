/// In-process record store
///
/// Records live for the lifetime of the process. Mutations go through the
/// `DashMap` entry API so a key is only ever touched under its shard lock,
/// and no guard outlives the call.
use async_trait::async_trait;
use dashmap::DashMap;
use tracing::debug;

use super::{RepoResult, VideoRepository};
use crate::models::CandidateVideoRecord;

#[derive(Debug, Default)]
pub struct MemoryVideoRepository {
    videos: DashMap<String, CandidateVideoRecord>,
}

impl MemoryVideoRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of persisted records.
    pub fn len(&self) -> usize {
        self.videos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.videos.is_empty()
    }

    fn with_record<T>(&self, invite_id: &str, f: impl FnOnce(&mut CandidateVideoRecord) -> T) -> T {
        let mut record = self
            .videos
            .entry(invite_id.to_string())
            .or_insert_with(|| CandidateVideoRecord::empty(invite_id));
        f(record.value_mut())
    }
}

#[async_trait]
impl VideoRepository for MemoryVideoRepository {
    async fn create_invite(&self, invite_id: &str) -> RepoResult<String> {
        self.with_record(invite_id, |_| ());
        debug!(invite_id, "Invite ensured");
        Ok(invite_id.to_string())
    }

    async fn get_video(&self, invite_id: &str) -> RepoResult<CandidateVideoRecord> {
        Ok(self
            .videos
            .get(invite_id)
            .map(|record| record.value().clone())
            .unwrap_or_else(|| CandidateVideoRecord::empty(invite_id)))
    }

    async fn set_video_url(&self, invite_id: &str, url: &str) -> RepoResult<()> {
        self.with_record(invite_id, |record| record.url = Some(url.to_string()));
        debug!(invite_id, url, "Video url set");
        Ok(())
    }

    async fn add_tag(&self, invite_id: &str, tag: &str) -> RepoResult<Vec<String>> {
        let tags = self.with_record(invite_id, |record| {
            record.add_tag(tag);
            record.tags.clone()
        });
        debug!(invite_id, tag, "Tag added");
        Ok(tags)
    }

    async fn remove_tag(&self, invite_id: &str, tag: &str) -> RepoResult<Vec<String>> {
        let tags = self.with_record(invite_id, |record| {
            record.remove_tag(tag);
            record.tags.clone()
        });
        debug!(invite_id, tag, "Tag removed");
        Ok(tags)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_unknown_invite_reads_as_empty_without_persisting() {
        let repo = MemoryVideoRepository::new();

        let record = repo.get_video("never-created").await.unwrap();

        assert_eq!(record, CandidateVideoRecord::empty("never-created"));
        assert!(repo.is_empty());
    }

    #[tokio::test]
    async fn test_create_invite_is_idempotent() {
        let repo = MemoryVideoRepository::new();

        assert_eq!(repo.create_invite("abc").await.unwrap(), "abc");
        repo.add_tag("abc", "funny").await.unwrap();
        repo.set_video_url("abc", "uploads/abc.webm").await.unwrap();
        assert_eq!(repo.create_invite("abc").await.unwrap(), "abc");

        let record = repo.get_video("abc").await.unwrap();
        assert_eq!(record.url.as_deref(), Some("uploads/abc.webm"));
        assert_eq!(record.tags, vec!["funny"]);
        assert_eq!(repo.len(), 1);
    }

    #[tokio::test]
    async fn test_add_tag_is_idempotent() {
        let repo = MemoryVideoRepository::new();

        repo.add_tag("abc", "a").await.unwrap();
        let tags = repo.add_tag("abc", "a").await.unwrap();

        assert_eq!(tags, vec!["a"]);
    }

    #[tokio::test]
    async fn test_add_tag_commutes_across_distinct_tags() {
        let first = MemoryVideoRepository::new();
        first.add_tag("abc", "a").await.unwrap();
        let ab = first.add_tag("abc", "b").await.unwrap();

        let second = MemoryVideoRepository::new();
        second.add_tag("abc", "b").await.unwrap();
        let ba = second.add_tag("abc", "a").await.unwrap();

        let mut ab_sorted = ab.clone();
        let mut ba_sorted = ba.clone();
        ab_sorted.sort();
        ba_sorted.sort();
        assert_eq!(ab_sorted, ba_sorted);
    }

    #[tokio::test]
    async fn test_remove_missing_tag_leaves_set_unchanged() {
        let repo = MemoryVideoRepository::new();
        repo.add_tag("abc", "funny").await.unwrap();

        let tags = repo.remove_tag("abc", "sad").await.unwrap();

        assert_eq!(tags, vec!["funny"]);
    }

    #[tokio::test]
    async fn test_remove_tag_creates_record() {
        let repo = MemoryVideoRepository::new();

        let tags = repo.remove_tag("fresh", "x").await.unwrap();

        assert!(tags.is_empty());
        assert_eq!(repo.len(), 1);
    }

    #[tokio::test]
    async fn test_set_video_url_replaces() {
        let repo = MemoryVideoRepository::new();

        repo.set_video_url("abc", "X").await.unwrap();
        assert_eq!(repo.get_video("abc").await.unwrap().url.as_deref(), Some("X"));

        repo.set_video_url("abc", "Y").await.unwrap();
        assert_eq!(repo.get_video("abc").await.unwrap().url.as_deref(), Some("Y"));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_tag_mutations_keep_set_semantics() {
        let repo = Arc::new(MemoryVideoRepository::new());
        let mut handles = Vec::new();

        for i in 0..64 {
            let repo = repo.clone();
            handles.push(tokio::spawn(async move {
                let tag = format!("tag-{}", i % 8);
                repo.add_tag("abc", &tag).await.unwrap();
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        let mut tags = repo.get_video("abc").await.unwrap().tags;
        tags.sort();
        let expected: Vec<String> = (0..8).map(|i| format!("tag-{}", i)).collect();
        assert_eq!(tags, expected);
    }
}
