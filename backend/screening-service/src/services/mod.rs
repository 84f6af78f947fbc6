/// Service layer for screening-service
///
/// - Storage: blob storage backends for uploaded videos
pub mod storage;

pub use storage::{build_storage, BlobStorage, LocalStorage, StorageError};
