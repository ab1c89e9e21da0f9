//! Asset upload bridge used while editing.
//!
//! # Responsibility
//! - Define the contract that turns raw file bytes into a durable reference.
//! - Name the draft fields an uploaded reference may be written into.
//!
//! # Invariants
//! - Upload results are written into the draft only, never into committed
//!   state or the rollback snapshot.
//! - A failed upload leaves the target draft field unchanged.

mod local_store;

pub use local_store::{LocalAssetStore, DEFAULT_ASSET_URL_PREFIX};

use std::error::Error;
use std::fmt::{Display, Formatter};

/// Result type for upload operations.
pub type UploadResult<T> = Result<T, UploadError>;

/// Durable reference returned by an uploader.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetRef {
    /// URL or path stored into the draft.
    pub url: String,
}

impl AssetRef {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }

    /// Last path segment, shown next to the upload control.
    pub fn file_name(&self) -> &str {
        self.url.rsplit('/').next().unwrap_or(self.url.as_str())
    }
}

/// Draft field receiving an uploaded reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetTarget {
    /// `Record::image`.
    Image,
    /// `Record::files`.
    Files,
    /// `content` of the image block at this section index.
    SectionImage(usize),
}

/// Upload failures reported by an uploader.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadError {
    /// Payload has no bytes.
    Empty,
    /// Storage answered with an explicit reason.
    Rejected(String),
    /// Storage could not be reached or failed mid-write.
    Transport(String),
}

impl UploadError {
    /// Operator-facing message.
    pub fn user_message(&self) -> String {
        match self {
            Self::Rejected(reason) if !reason.trim().is_empty() => reason.clone(),
            Self::Transport(_) => "Upload error".to_string(),
            _ => "Upload failed".to_string(),
        }
    }
}

impl Display for UploadError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Empty => write!(f, "upload payload is empty"),
            Self::Rejected(reason) => write!(f, "upload rejected: {reason}"),
            Self::Transport(message) => write!(f, "upload transport failed: {message}"),
        }
    }
}

impl Error for UploadError {}

/// External upload operation.
pub trait AssetUploader {
    /// Stores `bytes` and returns a reference to them.
    ///
    /// `file_name` is the operator's original file name; implementations may
    /// use it for the extension but must not trust it as a path.
    fn upload_asset(&self, file_name: &str, bytes: &[u8]) -> UploadResult<AssetRef>;
}

impl<T: AssetUploader + ?Sized> AssetUploader for &T {
    fn upload_asset(&self, file_name: &str, bytes: &[u8]) -> UploadResult<AssetRef> {
        (**self).upload_asset(file_name, bytes)
    }
}
