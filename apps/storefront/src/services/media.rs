//! Product image storage.

use std::path::PathBuf;

use async_trait::async_trait;
use mockall::automock;
use tracing::info;
use uuid::Uuid;

use super::{StoreError, StoreResult};

#[automock]
#[async_trait]
pub trait MediaStore: Send + Sync {
    /// Stores the file and returns its public URL.
    async fn upload(&self, file_name: &str, bytes: Vec<u8>) -> StoreResult<String>;
}

/// Keeps uploads in a local directory served under `base_url`.
#[derive(Debug, Clone)]
pub struct LocalMediaStore {
    dir: PathBuf,
    base_url: String,
}

impl LocalMediaStore {
    pub fn new(dir: impl Into<PathBuf>, base_url: impl Into<String>) -> Self {
        LocalMediaStore {
            dir: dir.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }
}

/// Keeps only the characters that are safe in a URL path segment.
fn sanitize_file_name(file_name: &str) -> String {
    let cleaned: String = file_name
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_'))
        .collect();
    if cleaned.is_empty() {
        "upload".to_string()
    } else {
        cleaned
    }
}

#[async_trait]
impl MediaStore for LocalMediaStore {
    async fn upload(&self, file_name: &str, bytes: Vec<u8>) -> StoreResult<String> {
        let stored = format!("{}-{}", Uuid::new_v4(), sanitize_file_name(file_name));

        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| StoreError::unavailable("media", e))?;
        tokio::fs::write(self.dir.join(&stored), &bytes)
            .await
            .map_err(|e| StoreError::unavailable("media", e))?;

        info!(file = %stored, size = bytes.len(), "Image uploaded");
        Ok(format!("{}/{}", self.base_url, stored))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_file_name() {
        assert_eq!(sanitize_file_name("oud rose.png"), "oudrose.png");
        assert_eq!(sanitize_file_name("../../etc/passwd"), "passwd");
        assert_eq!(sanitize_file_name("عطر"), "upload");
    }

    #[tokio::test]
    async fn test_local_upload_writes_file() {
        let dir = std::env::temp_dir().join(format!("zari-media-{}", Uuid::new_v4()));
        let store = LocalMediaStore::new(&dir, "http://localhost/media/");

        let url = store.upload("bottle.jpg", vec![1, 2, 3]).await.unwrap();
        assert!(url.starts_with("http://localhost/media/"));
        assert!(url.ends_with("-bottle.jpg"));

        let name = url.rsplit('/').next().unwrap();
        let written = tokio::fs::read(dir.join(name)).await.unwrap();
        assert_eq!(written, vec![1, 2, 3]);

        tokio::fs::remove_dir_all(&dir).await.unwrap();
    }
}
