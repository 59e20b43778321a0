/// Attachment blob storage on local disk
///
/// Blobs are written before the database transaction that records them.
/// Removal is best-effort: a failure is logged and never retried, since the
/// database row is already gone by then.

use bytes::Bytes;
use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use uuid::Uuid;

/// Storage errors
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to create upload directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// File received in a multipart request
#[derive(Debug, Clone)]
pub struct Upload {
    /// Client-side file name
    pub file_name: String,

    /// Declared MIME type
    pub content_type: Option<String>,

    pub data: Bytes,
}

impl Upload {
    pub fn size(&self) -> usize {
        self.data.len()
    }
}

/// Blob written to disk
#[derive(Debug, Clone, PartialEq)]
pub struct StoredFile {
    pub file_name: String,
    pub path: String,
    pub size: i64,
    pub content_type: String,
}

/// Directory-backed blob store
#[derive(Debug, Clone)]
pub struct UploadStore {
    root: PathBuf,
}

/// Unique on-disk name: timestamp, random suffix, sanitized client name
pub fn stored_file_name(original: &str, now: DateTime<Utc>, id: Uuid) -> String {
    let base = Path::new(original)
        .file_name()
        .and_then(|name| name.to_str())
        .filter(|name| !name.is_empty())
        .unwrap_or("upload");

    let sanitized: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();

    let suffix = id.simple().to_string();
    format!(
        "{}-{}-{}",
        now.format("%Y-%m-%dT%H-%M-%S%.3fZ"),
        &suffix[..8],
        sanitized
    )
}

impl UploadStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Creates the upload directory if missing
    pub async fn ensure_root(&self) -> Result<(), StorageError> {
        tokio::fs::create_dir_all(&self.root)
            .await
            .map_err(|source| StorageError::CreateDir {
                path: self.root.clone(),
                source,
            })
    }

    /// Writes an upload under a fresh name
    pub async fn save(&self, upload: &Upload) -> Result<StoredFile, StorageError> {
        self.ensure_root().await?;

        let file_name = stored_file_name(&upload.file_name, Utc::now(), Uuid::new_v4());
        let path = self.root.join(&file_name);

        tokio::fs::write(&path, &upload.data)
            .await
            .map_err(|source| StorageError::Write {
                path: path.clone(),
                source,
            })?;

        debug!(path = %path.display(), size = upload.size(), "Stored upload");

        Ok(StoredFile {
            file_name,
            path: path.to_string_lossy().into_owned(),
            size: upload.size() as i64,
            content_type: upload.content_type.clone().unwrap_or_default(),
        })
    }

    /// Removes a blob, logging instead of failing
    pub async fn remove(&self, path: &str) {
        match tokio::fs::remove_file(path).await {
            Ok(()) => debug!(path, "Removed stored file"),
            Err(error) => warn!(path, error = %error, "Failed to remove stored file"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn upload(name: &str, data: &'static [u8]) -> Upload {
        Upload {
            file_name: name.to_string(),
            content_type: Some("application/pdf".to_string()),
            data: Bytes::from_static(data),
        }
    }

    #[test]
    fn test_stored_file_name_sanitizes() {
        let now = Utc.with_ymd_and_hms(2024, 3, 1, 10, 30, 15).unwrap();
        let id = Uuid::parse_str("0123456789abcdef0123456789abcdef").unwrap();

        assert_eq!(
            stored_file_name("../../etc/my report (v2).pdf", now, id),
            "2024-03-01T10-30-15.000Z-01234567-my_report__v2_.pdf"
        );
        assert_eq!(
            stored_file_name("", now, id),
            "2024-03-01T10-30-15.000Z-01234567-upload"
        );
    }

    #[tokio::test]
    async fn test_save_and_remove() {
        let root = std::env::temp_dir().join(format!("taskboard-storage-{}", Uuid::new_v4()));
        let store = UploadStore::new(&root);

        let stored = store.save(&upload("plan.pdf", b"%PDF-1.4")).await.unwrap();
        assert_eq!(stored.size, 8);
        assert_eq!(stored.content_type, "application/pdf");
        assert!(stored.file_name.ends_with("-plan.pdf"));
        assert_eq!(tokio::fs::read(&stored.path).await.unwrap(), b"%PDF-1.4");

        store.remove(&stored.path).await;
        assert!(tokio::fs::metadata(&stored.path).await.is_err());

        // second removal only logs
        store.remove(&stored.path).await;

        tokio::fs::remove_dir_all(&root).await.unwrap();
    }
}
