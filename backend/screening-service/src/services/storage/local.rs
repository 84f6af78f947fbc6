/// Local filesystem storage
///
/// Objects are written to `<base_dir>/<key>`. Each save streams into a
/// private `.part` file next to the destination and renames it into place
/// once every chunk is flushed, so a failed or aborted upload never replaces
/// the previous object. The partial file is removed on every exit path,
/// including when the save future is dropped mid-stream.
use async_trait::async_trait;
use futures::StreamExt;
use std::path::{Component, Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, warn};

use super::{BlobStorage, ByteStream, StorageError, StorageResult};

static PART_COUNTER: AtomicU64 = AtomicU64::new(0);

#[derive(Debug, Clone)]
pub struct LocalStorage {
    base_dir: PathBuf,
}

impl LocalStorage {
    /// Create the storage root if it does not exist yet.
    pub fn new(base_dir: impl AsRef<Path>) -> std::io::Result<Self> {
        let base_dir = base_dir.as_ref().to_path_buf();
        std::fs::create_dir_all(&base_dir)?;
        info!(base_dir = %base_dir.display(), "Local storage initialized");
        Ok(Self { base_dir })
    }

    fn resolve(&self, key: &str) -> StorageResult<PathBuf> {
        let relative = Path::new(key);
        let is_plain = !key.is_empty()
            && relative
                .components()
                .all(|component| matches!(component, Component::Normal(_)));
        if !is_plain {
            return Err(StorageError::InvalidKey(key.to_string()));
        }
        Ok(self.base_dir.join(relative))
    }
}

/// Owns a partial file until it is renamed into place.
struct PartialFile {
    path: PathBuf,
    persisted: bool,
}

impl PartialFile {
    fn new(dest: &Path) -> Self {
        Self {
            path: partial_path(dest),
            persisted: false,
        }
    }

    async fn persist(mut self, dest: &Path) -> StorageResult<()> {
        fs::rename(&self.path, dest).await?;
        self.persisted = true;
        Ok(())
    }
}

impl Drop for PartialFile {
    fn drop(&mut self) {
        if self.persisted {
            return;
        }
        match std::fs::remove_file(&self.path) {
            Ok(()) => debug!(path = %self.path.display(), "Partial file removed"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => warn!(path = %self.path.display(), error = %e, "Partial file cleanup failed"),
        }
    }
}

fn partial_path(dest: &Path) -> PathBuf {
    let name = dest
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let seq = PART_COUNTER.fetch_add(1, Ordering::Relaxed);
    dest.with_file_name(format!(".{}.{}.{}.part", name, std::process::id(), seq))
}

async fn write_stream(path: &Path, data: &mut ByteStream) -> StorageResult<u64> {
    let mut file = fs::File::create(path).await?;
    let mut written = 0u64;
    while let Some(chunk) = data.next().await {
        let chunk = chunk.map_err(StorageError::Stream)?;
        file.write_all(&chunk).await?;
        written += chunk.len() as u64;
    }
    file.flush().await?;
    file.sync_all().await?;
    Ok(written)
}

#[async_trait(?Send)]
impl BlobStorage for LocalStorage {
    async fn save(
        &self,
        key: &str,
        mut data: ByteStream,
        content_type: Option<&str>,
    ) -> StorageResult<String> {
        let dest = self.resolve(key)?;
        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent).await?;
        }

        let partial = PartialFile::new(&dest);
        let written = match write_stream(&partial.path, &mut data).await {
            Ok(written) => written,
            Err(err) => {
                warn!(key, error = %err, "Save aborted; previous content kept");
                return Err(err);
            }
        };

        partial.persist(&dest).await?;
        info!(key, bytes = written, content_type, "Object stored");
        Ok(self.url(key))
    }

    fn url(&self, key: &str) -> String {
        self.base_dir.join(key).to_string_lossy().into_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use futures::stream;
    use std::io;
    use std::time::Duration;

    fn chunks(parts: &[&'static str]) -> ByteStream {
        let items: Vec<io::Result<Bytes>> = parts
            .iter()
            .map(|p| Ok(Bytes::from_static(p.as_bytes())))
            .collect();
        stream::iter(items).boxed_local()
    }

    fn failing_after(part: &'static str) -> ByteStream {
        stream::iter(vec![
            Ok(Bytes::from_static(part.as_bytes())),
            Err(io::Error::new(io::ErrorKind::ConnectionAborted, "client went away")),
        ])
        .boxed_local()
    }

    #[tokio::test]
    async fn test_save_writes_all_chunks() {
        let dir = tempfile::tempdir().unwrap();
        let storage = LocalStorage::new(dir.path()).unwrap();

        let location = storage
            .save("abc.webm", chunks(&["hello ", "world"]), Some("video/webm"))
            .await
            .unwrap();

        assert_eq!(location, storage.url("abc.webm"));
        let content = std::fs::read(dir.path().join("abc.webm")).unwrap();
        assert_eq!(content, b"hello world");
    }

    #[tokio::test]
    async fn test_save_overwrites_existing_object() {
        let dir = tempfile::tempdir().unwrap();
        let storage = LocalStorage::new(dir.path()).unwrap();

        storage
            .save("abc.webm", chunks(&["first version, longer"]), None)
            .await
            .unwrap();
        storage
            .save("abc.webm", chunks(&["second"]), None)
            .await
            .unwrap();

        let content = std::fs::read(dir.path().join("abc.webm")).unwrap();
        assert_eq!(content, b"second");
    }

    #[tokio::test]
    async fn test_failed_stream_keeps_previous_object() {
        let dir = tempfile::tempdir().unwrap();
        let storage = LocalStorage::new(dir.path()).unwrap();
        storage
            .save("abc.webm", chunks(&["good"]), None)
            .await
            .unwrap();

        let err = storage
            .save("abc.webm", failing_after("partial"), None)
            .await
            .unwrap_err();

        assert!(matches!(err, StorageError::Stream(_)));
        let content = std::fs::read(dir.path().join("abc.webm")).unwrap();
        assert_eq!(content, b"good");
        assert!(partial_files(dir.path()).is_empty());
    }

    fn partial_files(dir: &Path) -> Vec<String> {
        std::fs::read_dir(dir)
            .unwrap()
            .filter_map(|e| e.ok())
            .map(|e| e.file_name().to_string_lossy().into_owned())
            .filter(|name| name.ends_with(".part"))
            .collect()
    }

    #[tokio::test]
    async fn test_dropped_save_leaves_no_partial_files() {
        let dir = tempfile::tempdir().unwrap();
        let storage = LocalStorage::new(dir.path()).unwrap();

        for _ in 0..3 {
            let stalled = stream::once(async { Ok::<_, io::Error>(Bytes::from_static(b"partial")) })
                .chain(stream::pending())
                .boxed_local();
            let result = tokio::time::timeout(
                Duration::from_millis(50),
                storage.save("abc.webm", stalled, None),
            )
            .await;
            assert!(result.is_err(), "stalled save should not complete");
        }

        storage
            .save("abc.webm", chunks(&["complete"]), None)
            .await
            .unwrap();

        assert!(partial_files(dir.path()).is_empty(), "{:?}", partial_files(dir.path()));
        let content = std::fs::read(dir.path().join("abc.webm")).unwrap();
        assert_eq!(content, b"complete");
    }

    #[tokio::test]
    async fn test_save_creates_intermediate_directories() {
        let dir = tempfile::tempdir().unwrap();
        let storage = LocalStorage::new(dir.path()).unwrap();

        storage
            .save("team/abc.webm", chunks(&["nested"]), None)
            .await
            .unwrap();

        assert!(dir.path().join("team").join("abc.webm").is_file());
    }

    #[tokio::test]
    async fn test_rejects_keys_outside_root() {
        let dir = tempfile::tempdir().unwrap();
        let storage = LocalStorage::new(dir.path().join("uploads")).unwrap();

        for key in ["../escape.webm", "/etc/passwd", ""] {
            let err = storage
                .save(key, chunks(&["x"]), None)
                .await
                .unwrap_err();
            assert!(matches!(err, StorageError::InvalidKey(_)), "key {:?}", key);
        }
        assert!(!dir.path().join("escape.webm").exists());
    }

    #[test]
    fn test_url_is_deterministic_and_lazy() {
        let dir = tempfile::tempdir().unwrap();
        let storage = LocalStorage::new(dir.path()).unwrap();

        let url = storage.url("missing.webm");

        assert_eq!(url, storage.url("missing.webm"));
        assert!(url.ends_with("missing.webm"));
        assert!(!dir.path().join("missing.webm").exists());
    }
}
