//! Stored vacation images.
//!
//! Files live flat inside one directory under server-generated names
//! (`<uuid>.<ext>`). Removal never reaches outside that directory.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::errors::ServiceError;

pub const ALLOWED_CONTENT_TYPES: [(&str, &str); 4] = [
    ("image/jpeg", "jpg"),
    ("image/png", "png"),
    ("image/webp", "webp"),
    ("image/gif", "gif"),
];

/// An upload held in memory after size and type checks at the boundary.
#[derive(Debug, Clone)]
pub struct UploadedImage {
    pub bytes: Vec<u8>,
    pub content_type: String,
    pub original_name: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ImageStore {
    dir: PathBuf,
    max_bytes: usize,
}

/// File extension for an allowed content type.
pub fn extension_for(content_type: &str) -> Option<&'static str> {
    let essence = content_type.split(';').next().unwrap_or("").trim().to_ascii_lowercase();
    ALLOWED_CONTENT_TYPES
        .iter()
        .find(|(ct, _)| *ct == essence)
        .map(|(_, ext)| *ext)
}

/// Names this store could have produced: one path component, no traversal.
fn is_plain_file_name(name: &str) -> bool {
    !name.is_empty()
        && name != "."
        && !name.contains("..")
        && !name.contains('/')
        && !name.contains('\\')
        && !name.contains('\0')
}

impl ImageStore {
    pub fn new(dir: impl Into<PathBuf>, max_bytes: usize) -> Self {
        Self { dir: dir.into(), max_bytes }
    }

    pub fn from_config(cfg: &configs::UploadsConfig) -> Self {
        Self::new(&cfg.images_dir, cfg.max_image_bytes)
    }

    pub fn dir(&self) -> &Path { &self.dir }

    pub fn max_bytes(&self) -> usize { self.max_bytes }

    pub fn check_content_type(&self, content_type: &str) -> Result<&'static str, ServiceError> {
        extension_for(content_type).ok_or_else(|| ServiceError::Validation("Invalid image file".into()))
    }

    pub fn check_size(&self, len: usize) -> Result<(), ServiceError> {
        if len > self.max_bytes {
            return Err(ServiceError::Validation(format!(
                "Image is too large (max {}MB)",
                self.max_bytes / (1024 * 1024)
            )));
        }
        Ok(())
    }

    /// Write the upload under a fresh name and return that name.
    pub async fn store(&self, image: &UploadedImage) -> Result<String, ServiceError> {
        let ext = self.check_content_type(&image.content_type)?;
        self.check_size(image.bytes.len())?;
        if image.bytes.is_empty() {
            return Err(ServiceError::Validation("Image file is empty".into()));
        }
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| ServiceError::Storage(format!("cannot create {}: {e}", self.dir.display())))?;
        let name = format!("{}.{}", Uuid::new_v4(), ext);
        let path = self.dir.join(&name);
        if let Err(e) = tokio::fs::write(&path, &image.bytes).await {
            let _ = tokio::fs::remove_file(&path).await;
            return Err(ServiceError::Storage(format!("cannot write {}: {e}", path.display())));
        }
        info!(file = %name, bytes = image.bytes.len(), original = image.original_name.as_deref().unwrap_or(""), "image stored");
        Ok(name)
    }

    /// Resolve a stored name to a path inside the directory, if it is one.
    async fn resolve(&self, name: &str) -> Result<Option<PathBuf>, std::io::Error> {
        if !is_plain_file_name(name) {
            return Ok(None);
        }
        let root = tokio::fs::canonicalize(&self.dir).await?;
        let candidate = tokio::fs::canonicalize(self.dir.join(name)).await?;
        if candidate.parent() != Some(root.as_path()) {
            return Ok(None);
        }
        Ok(Some(candidate))
    }

    /// Delete a stored file. Missing files count as deleted; other failures
    /// are logged and swallowed.
    pub async fn remove(&self, name: &str) {
        let path = match self.resolve(name).await {
            Ok(Some(p)) => p,
            Ok(None) => {
                warn!(file = %name, "refusing to remove file outside images directory");
                return;
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(file = %name, "image already gone");
                return;
            }
            Err(e) => {
                warn!(file = %name, error = %e, "cannot resolve image path");
                return;
            }
        };
        match tokio::fs::remove_file(&path).await {
            Ok(()) => info!(file = %name, "image removed"),
            Err(e) if e.kind() == ErrorKind::NotFound => debug!(file = %name, "image already gone"),
            Err(e) => warn!(file = %name, error = %e, "failed deleting image"),
        }
    }

    pub async fn exists(&self, name: &str) -> bool {
        matches!(self.resolve(name).await, Ok(Some(_)))
    }

    /// Number of regular files currently stored.
    pub async fn count(&self) -> usize {
        let Ok(mut entries) = tokio::fs::read_dir(&self.dir).await else { return 0 };
        let mut n = 0;
        while let Ok(Some(entry)) = entries.next_entry().await {
            if entry.file_type().await.map(|t| t.is_file()).unwrap_or(false) {
                n += 1;
            }
        }
        n
    }
}
