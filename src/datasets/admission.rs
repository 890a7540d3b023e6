//! Pre-write admission checks for uploads: format, size, and owner quota.
//!
//! The checks run in a fixed order and short-circuit: format first, then the
//! single-file size cap, then the cumulative per-owner quota. Quota needs a
//! storage listing, so callers fetch the owner's usage only after the first
//! two checks pass.

use thiserror::Error;

use crate::tabular::TabularFormat;

/// Maximum size of a single uploaded file (1 MiB).
pub const MAX_FILE_BYTES: u64 = 1024 * 1024;

/// Maximum cumulative stored bytes per owner (50 MiB).
pub const OWNER_QUOTA_BYTES: u64 = 50 * 1024 * 1024;

/// Errors from upload admission.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AdmissionError {
    #[error("File must be .xlsx, .xls, or .csv")]
    UnsupportedFormat,

    #[error("File size exceeds 1MB limit")]
    FileTooLarge { size: u64, limit: u64 },

    #[error("Storage limit of 50MB exceeded")]
    QuotaExceeded { usage: u64, size: u64, quota: u64 },
}

/// Resolve the upload's format from its filename extension.
pub fn check_format(filename: &str) -> Result<TabularFormat, AdmissionError> {
    TabularFormat::from_filename(filename).ok_or(AdmissionError::UnsupportedFormat)
}

/// Enforce the single-file size cap.
pub fn check_size(size: u64) -> Result<(), AdmissionError> {
    if size > MAX_FILE_BYTES {
        return Err(AdmissionError::FileTooLarge {
            size,
            limit: MAX_FILE_BYTES,
        });
    }
    Ok(())
}

/// Enforce the per-owner quota given the owner's current stored bytes.
pub fn check_quota(usage: u64, size: u64) -> Result<(), AdmissionError> {
    if usage.saturating_add(size) > OWNER_QUOTA_BYTES {
        return Err(AdmissionError::QuotaExceeded {
            usage,
            size,
            quota: OWNER_QUOTA_BYTES,
        });
    }
    Ok(())
}
