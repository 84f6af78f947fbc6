/// Data models for screening-service
///
/// This module defines structures for:
/// - CandidateVideoRecord: the invite record (url + tags)
/// - UploadResponse / HealthResponse: REST response bodies
use serde::{Deserialize, Serialize};

// ========================================
// Candidate Video Models
// ========================================

/// A candidate video tracked under one invite.
///
/// `tags` behaves as a set: no duplicates, insertion order kept for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateVideoRecord {
    pub invite_id: String,
    pub url: Option<String>,
    pub tags: Vec<String>,
}

impl CandidateVideoRecord {
    /// Zero-value record: no video uploaded, no tags.
    pub fn empty(invite_id: impl Into<String>) -> Self {
        Self {
            invite_id: invite_id.into(),
            url: None,
            tags: Vec::new(),
        }
    }

    /// Insert `tag` unless already present. Returns whether the set changed.
    pub fn add_tag(&mut self, tag: &str) -> bool {
        if self.tags.iter().any(|t| t == tag) {
            return false;
        }
        self.tags.push(tag.to_string());
        true
    }

    /// Remove `tag` if present. Returns whether the set changed.
    pub fn remove_tag(&mut self, tag: &str) -> bool {
        let before = self.tags.len();
        self.tags.retain(|t| t != tag);
        self.tags.len() != before
    }
}

// ========================================
// REST Response Models
// ========================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadResponse {
    pub status: String,
    #[serde(rename = "videoUrl")]
    pub video_url: String,
}

impl UploadResponse {
    pub fn uploaded(video_url: impl Into<String>) -> Self {
        Self {
            status: "uploaded".to_string(),
            video_url: video_url.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub healthy: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_record() {
        let record = CandidateVideoRecord::empty("abc");
        assert_eq!(record.invite_id, "abc");
        assert!(record.url.is_none());
        assert!(record.tags.is_empty());
    }

    #[test]
    fn test_add_tag_suppresses_duplicates() {
        let mut record = CandidateVideoRecord::empty("abc");
        assert!(record.add_tag("funny"));
        assert!(!record.add_tag("funny"));
        assert!(record.add_tag("calm"));
        assert_eq!(record.tags, vec!["funny", "calm"]);
    }

    #[test]
    fn test_remove_missing_tag_is_noop() {
        let mut record = CandidateVideoRecord::empty("abc");
        record.add_tag("funny");
        assert!(!record.remove_tag("sad"));
        assert_eq!(record.tags, vec!["funny"]);
        assert!(record.remove_tag("funny"));
        assert!(record.tags.is_empty());
    }

    #[test]
    fn test_upload_response_wire_shape() {
        let body = serde_json::to_value(UploadResponse::uploaded("uploads/abc.webm")).unwrap();
        assert_eq!(
            body,
            serde_json::json!({"status": "uploaded", "videoUrl": "uploads/abc.webm"})
        );
    }
}
