use std::path::PathBuf;

use anyhow::Context;
use axum::async_trait;
use bytes::Bytes;

/// Content area for uploaded logos and generated images.
///
/// Injected behind a trait so tests can substitute an in-memory fake.
#[async_trait]
pub trait StorageClient: Send + Sync {
    async fn put_object(&self, key: &str, body: Bytes, content_type: &str) -> anyhow::Result<()>;

    /// Publicly-resolvable URL for a stored object.
    fn public_url(&self, key: &str) -> String;
}

/// Filesystem-backed storage. Objects land under `root/<key>` and are served
/// by the static `/uploads` route.
#[derive(Clone)]
pub struct FsStorage {
    root: PathBuf,
    base_url: String,
}

impl FsStorage {
    pub fn new(root: impl Into<PathBuf>, base_url: &str) -> Self {
        Self {
            root: root.into(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl StorageClient for FsStorage {
    async fn put_object(&self, key: &str, body: Bytes, _content_type: &str) -> anyhow::Result<()> {
        let path = self.root.join(key);
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .with_context(|| format!("create dir {}", parent.display()))?;
        }
        tokio::fs::write(&path, &body)
            .await
            .with_context(|| format!("write object {}", path.display()))?;
        Ok(())
    }

    fn public_url(&self, key: &str) -> String {
        format!("{}/uploads/{}", self.base_url, key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn put_object_writes_file_and_creates_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FsStorage::new(dir.path(), "http://localhost:8080");

        storage
            .put_object("postings/abc/poster-1.jpg", Bytes::from_static(b"img"), "image/jpeg")
            .await
            .unwrap();

        let written = std::fs::read(dir.path().join("postings/abc/poster-1.jpg")).unwrap();
        assert_eq!(written, b"img");
    }

    #[test]
    fn public_url_joins_base_and_key() {
        let storage = FsStorage::new("/tmp/x", "http://localhost:8080/");
        assert_eq!(
            storage.public_url("logos/a-1.png"),
            "http://localhost:8080/uploads/logos/a-1.png"
        );
    }
}
