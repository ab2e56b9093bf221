//! Uploaded files on local disk, served back under a URL prefix.

use std::io;
use std::path::{Path, PathBuf};
use uuid::Uuid;

const RECIPE_UPLOAD_DIR: &str = "uploads/recipe";

#[derive(Debug, Clone)]
pub struct MediaStore {
    root: PathBuf,
    url_prefix: String,
}

impl MediaStore {
    pub fn new(root: impl Into<PathBuf>, url_prefix: &str) -> Self {
        let trimmed = url_prefix.trim_matches('/');
        let url_prefix = if trimmed.is_empty() {
            "/media".to_string()
        } else {
            format!("/{}", trimmed)
        };
        Self {
            root: root.into(),
            url_prefix,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Mount point for serving files, always with a leading and no trailing slash.
    pub fn url_prefix(&self) -> &str {
        &self.url_prefix
    }

    /// Public URL for a path relative to the media root.
    pub fn url(&self, relative: &str) -> String {
        format!("{}/{}", self.url_prefix, relative)
    }

    /// Fresh, collision-free relative path for a recipe image.
    pub fn recipe_image_path(extension: &str) -> String {
        format!("{}/{}.{}", RECIPE_UPLOAD_DIR, Uuid::new_v4(), extension)
    }

    pub async fn save(&self, relative: &str, data: &[u8]) -> io::Result<()> {
        let path = self.root.join(relative);
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&path, data).await
    }

    /// Remove a stored file. A file that is already gone is not an error.
    pub async fn remove(&self, relative: &str) -> io::Result<()> {
        match tokio::fs::remove_file(self.root.join(relative)).await {
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            other => other,
        }
    }
}
