//! Profile picture intake.
//!
//! Accepts at most one image per request under [`PROFILE_PICTURE_FIELD`],
//! checks both the declared content type and the leading magic bytes, and
//! hands accepted files to an [`UploadStore`].

use std::{fmt, sync::Arc};

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::domain::users::profile::errors::ProfileError;
use crate::error::Result;

/// Multipart field that carries the profile picture.
pub const PROFILE_PICTURE_FIELD: &str = "updateProfilePic";

/// Declared content types accepted for profile pictures.
pub const ALLOWED_CONTENT_TYPES: [&str; 3] = ["image/png", "image/jpg", "image/jpeg"];

/// A file part received with an update request.
#[derive(Clone)]
pub struct IncomingUpload {
    pub field_name: String,
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl fmt::Debug for IncomingUpload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IncomingUpload")
            .field("field_name", &self.field_name)
            .field("file_name", &self.file_name)
            .field("content_type", &self.content_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}

impl IncomingUpload {
    /// Browsers submit an empty part when the file input was left blank.
    fn is_blank(&self) -> bool {
        self.bytes.is_empty()
            && self.file_name.as_deref().is_none_or(|name| name.is_empty())
    }
}

/// Durable storage for accepted uploads.
#[async_trait]
pub trait UploadStore: Send + Sync + fmt::Debug {
    /// Persist `bytes` under a fresh, collision-resistant name with the given
    /// extension and return the relative path clients use to fetch it.
    async fn store(&self, extension: &str, bytes: &[u8]) -> Result<String>;

    /// Delete a previously stored file. Missing files are not an error.
    async fn remove(&self, relative_path: &str) -> Result<()>;
}

/// Image formats a profile picture may use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageKind {
    Png,
    Jpeg,
}

impl ImageKind {
    fn from_content_type(content_type: &str) -> Option<Self> {
        match content_type {
            "image/png" => Some(Self::Png),
            "image/jpg" | "image/jpeg" => Some(Self::Jpeg),
            _ => None,
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpg",
        }
    }
}

/// Detect PNG or JPEG from the leading bytes.
pub fn sniff_image_kind(data: &[u8]) -> Option<ImageKind> {
    // JPEG: FF D8 FF
    if data.len() >= 3 && data[0..3] == [0xFF, 0xD8, 0xFF] {
        return Some(ImageKind::Jpeg);
    }

    // PNG: 89 50 4E 47 0D 0A 1A 0A
    if data.len() >= 8
        && data[0..8] == [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A]
    {
        return Some(ImageKind::Png);
    }

    None
}

/// Validates and stores profile pictures.
#[derive(Debug, Clone)]
pub struct UploadIntake {
    store: Arc<dyn UploadStore>,
}

impl UploadIntake {
    pub fn new(store: Arc<dyn UploadStore>) -> Self {
        Self { store }
    }

    /// Check the request's file parts and persist the picture, if any.
    ///
    /// Returns the stored relative path, or `None` when no file was supplied.
    /// Nothing is written when any check fails.
    pub async fn accept(
        &self,
        uploads: Vec<IncomingUpload>,
    ) -> std::result::Result<Option<String>, ProfileError> {
        let mut uploads: Vec<IncomingUpload> =
            uploads.into_iter().filter(|u| !u.is_blank()).collect();

        if let Some(stray) =
            uploads.iter().find(|u| u.field_name != PROFILE_PICTURE_FIELD)
        {
            warn!(field = %stray.field_name, "rejected upload under unexpected field");
            return Err(ProfileError::UnexpectedFile {
                field: stray.field_name.clone(),
            });
        }

        if uploads.len() > 1 {
            warn!(count = uploads.len(), "rejected multiple profile pictures");
            return Err(ProfileError::UnexpectedFile {
                field: PROFILE_PICTURE_FIELD.to_string(),
            });
        }

        let Some(upload) = uploads.pop() else {
            return Ok(None);
        };

        let kind = Self::check_type(&upload)?;
        let path = self.store.store(kind.extension(), &upload.bytes).await?;
        debug!(path = %path, bytes = upload.bytes.len(), "stored profile picture");
        Ok(Some(path))
    }

    /// Remove a file stored by [`Self::accept`] after a later step failed.
    /// Failures are logged; the caller's original error wins.
    pub async fn discard(&self, relative_path: &str) {
        if let Err(err) = self.store.remove(relative_path).await {
            warn!(path = %relative_path, error = %err, "failed to remove orphaned upload");
        }
    }

    fn check_type(
        upload: &IncomingUpload,
    ) -> std::result::Result<ImageKind, ProfileError> {
        let content_type = upload
            .content_type
            .as_deref()
            .map(|ct| ct.trim().to_ascii_lowercase());

        let rejected = || {
            warn!(
                content_type = ?upload.content_type,
                file_name = ?upload.file_name,
                "rejected profile picture"
            );
            ProfileError::UnsupportedFileType {
                content_type: upload.content_type.clone(),
            }
        };

        let declared = content_type
            .as_deref()
            .filter(|ct| ALLOWED_CONTENT_TYPES.contains(ct))
            .and_then(ImageKind::from_content_type)
            .ok_or_else(rejected)?;

        match sniff_image_kind(&upload.bytes) {
            Some(actual) if actual == declared => Ok(actual),
            _ => Err(rejected()),
        }
    }
}
