use thiserror::Error;

use crate::storage::StorageKind;

/// Failures surfaced by storage plugins.
///
/// A url the storage does not know is not an error; lookups return `None`.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage `{location}` is unavailable: {reason}")]
    Unavailable { location: String, reason: String },
    #[error("resource `{url}` is corrupt: {reason}")]
    Corrupt { url: String, reason: String },
    #[error("no storage backend registered for {0}")]
    UnsupportedKind(StorageKind),
    #[error("cannot detect storage kind for `{0}`")]
    UnknownLocation(String),
}

impl StorageError {
    pub(crate) fn unavailable(location: impl Into<String>, reason: impl ToString) -> Self {
        StorageError::Unavailable {
            location: location.into(),
            reason: reason.to_string(),
        }
    }

    pub(crate) fn corrupt(url: impl Into<String>, reason: impl ToString) -> Self {
        StorageError::Corrupt {
            url: url.into(),
            reason: reason.to_string(),
        }
    }

    pub fn is_corrupt(&self) -> bool {
        matches!(self, StorageError::Corrupt { .. })
    }

    pub fn is_unavailable(&self) -> bool {
        matches!(self, StorageError::Unavailable { .. })
    }
}
