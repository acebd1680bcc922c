//! Product image uploads.
//!
//! Files are written to the configured upload directory under a random
//! name and served back at `/img/{file}`. The stored `image` value is that
//! `/img/...` path; [`resolve_image_url`] turns it into an absolute URL.

use std::path::{Path, PathBuf};

use axum::http::StatusCode;
use thiserror::Error;
use tracing::{info, warn};
use uuid::Uuid;

/// URL prefix uploaded images are served under.
pub const IMAGE_URL_PREFIX: &str = "/img/";

/// Accepted image extensions, lowercase.
const ALLOWED_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "webp"];

/// Errors from accepting or storing an image.
#[derive(Debug, Error)]
pub enum UploadError {
    #[error("Please upload an image")]
    MissingFile,

    #[error("Uploaded image is empty")]
    Empty,

    #[error("Images only! Allowed types: jpg, jpeg, png, gif, webp")]
    UnsupportedType,

    #[error("Image exceeds the {max_bytes} byte limit")]
    TooLarge { max_bytes: usize },

    #[error("could not store image: {0}")]
    Io(#[from] std::io::Error),
}

impl UploadError {
    /// HTTP status for this error.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::MissingFile | Self::Empty | Self::UnsupportedType => StatusCode::BAD_REQUEST,
            Self::TooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            Self::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Writes and removes uploaded product images.
#[derive(Debug, Clone)]
pub struct ImageStore {
    dir: PathBuf,
    max_bytes: usize,
}

impl ImageStore {
    #[must_use]
    pub const fn new(dir: PathBuf, max_bytes: usize) -> Self {
        Self { dir, max_bytes }
    }

    /// Directory images are stored in.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Check the client-supplied file name and size; returns the extension to use.
    ///
    /// # Errors
    ///
    /// `UnsupportedType` for a missing or disallowed extension, `Empty` for a
    /// zero-byte file, `TooLarge` above the configured limit.
    pub fn validate(&self, file_name: &str, len: usize) -> Result<&'static str, UploadError> {
        let ext = Path::new(file_name)
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .ok_or(UploadError::UnsupportedType)?;

        let ext = ALLOWED_EXTENSIONS
            .iter()
            .copied()
            .find(|allowed| *allowed == ext)
            .ok_or(UploadError::UnsupportedType)?;

        if len == 0 {
            return Err(UploadError::Empty);
        }
        if len > self.max_bytes {
            return Err(UploadError::TooLarge {
                max_bytes: self.max_bytes,
            });
        }

        Ok(ext)
    }

    /// Validate and write an image. Returns the `/img/...` path to store.
    ///
    /// # Errors
    ///
    /// Any [`ImageStore::validate`] error, or `Io` if the write fails.
    pub async fn save(&self, file_name: &str, bytes: &[u8]) -> Result<String, UploadError> {
        let ext = self.validate(file_name, bytes.len())?;
        let stored_name = format!("image-{}.{ext}", Uuid::new_v4().simple());

        tokio::fs::create_dir_all(&self.dir).await?;
        tokio::fs::write(self.dir.join(&stored_name), bytes).await?;

        info!(file = %stored_name, bytes = bytes.len(), "Stored product image");
        Ok(format!("{IMAGE_URL_PREFIX}{stored_name}"))
    }

    /// Delete a previously uploaded image. External URLs and unknown paths
    /// are ignored; failures are logged, never returned.
    pub async fn remove(&self, image: &str) {
        let Some(path) = self.local_path(image) else {
            return;
        };

        match tokio::fs::remove_file(&path).await {
            Ok(()) => info!(path = %path.display(), "Removed product image"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => warn!(path = %path.display(), error = %e, "Failed to remove product image"),
        }
    }

    /// On-disk path for an `/img/<name>` value, if it names a plain file.
    fn local_path(&self, image: &str) -> Option<PathBuf> {
        let name = image.strip_prefix(IMAGE_URL_PREFIX)?;
        let is_plain = !name.is_empty()
            && !name.contains(['/', '\\'])
            && name != "."
            && name != "..";
        is_plain.then(|| self.dir.join(name))
    }
}

/// Absolute URL for a product `image` value.
///
/// Absolute http(s) URLs pass through; anything else is treated as a path
/// on the storefront. An empty value stays empty.
#[must_use]
pub fn resolve_image_url(base_url: &str, image: &str) -> String {
    if image.is_empty() {
        return String::new();
    }
    if image.starts_with("http://") || image.starts_with("https://") {
        return image.to_string();
    }

    let base_url = base_url.trim_end_matches('/');
    if image.starts_with('/') {
        format!("{base_url}{image}")
    } else {
        format!("{base_url}/{image}")
    }
}
