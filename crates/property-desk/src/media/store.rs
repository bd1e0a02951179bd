use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::info;
use uuid::Uuid;

use crate::config::MediaConfig;

/// Extensions accepted for listing photos and walkthrough videos.
pub const ALLOWED_EXTENSIONS: [&str; 7] = ["jpg", "jpeg", "png", "webp", "mp4", "mov", "webm"];

/// File received from an admin upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaUpload {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    #[error("no file was provided in the `image` field")]
    MissingFile,
    #[error("uploaded file is empty")]
    Empty,
    #[error("file type `{0}` is not allowed")]
    UnsupportedType(String),
    #[error("object store failure: {0}")]
    Storage(#[from] std::io::Error),
}

/// Binary storage returning a public URL for each stored file.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    async fn upload(&self, upload: MediaUpload) -> Result<String, UploadError>;
}

/// Object store backed by a local directory, served back under `/uploads/`.
#[derive(Debug, Clone)]
pub struct LocalObjectStore {
    root: PathBuf,
    public_base_url: String,
}

impl LocalObjectStore {
    pub fn new(root: impl Into<PathBuf>, public_base_url: impl Into<String>) -> Self {
        let public_base_url = public_base_url.into();
        Self {
            root: root.into(),
            public_base_url: public_base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn from_config(config: &MediaConfig) -> Self {
        Self::new(config.upload_dir.clone(), config.public_base_url.clone())
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

fn allowed_extension(file_name: &str) -> Result<String, UploadError> {
    let extension = Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();

    if ALLOWED_EXTENSIONS.contains(&extension.as_str()) {
        Ok(extension)
    } else {
        Err(UploadError::UnsupportedType(file_name.to_string()))
    }
}

#[async_trait]
impl ObjectStore for LocalObjectStore {
    async fn upload(&self, upload: MediaUpload) -> Result<String, UploadError> {
        let extension = allowed_extension(&upload.file_name)?;
        if upload.bytes.is_empty() {
            return Err(UploadError::Empty);
        }

        let name = format!("{}.{extension}", Uuid::new_v4());
        tokio::fs::create_dir_all(&self.root).await?;
        tokio::fs::write(self.root.join(&name), &upload.bytes).await?;
        info!(file = %name, bytes = upload.bytes.len(), "media stored");

        Ok(format!("{}/uploads/{name}", self.public_base_url))
    }
}
