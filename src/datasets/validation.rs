//! Validation for uploaded filenames.
//!
//! Uploaded bytes land at `{owner_id}/{filename}`, so the filename must be a
//! single safe path segment that cannot escape the owner's prefix.

/// Maximum length for an uploaded filename, in bytes.
pub const MAX_FILENAME_LENGTH: usize = 255;

/// Error type for filename validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilenameError {
    Empty,
    TooLong(usize),
    Separator(char),
    InvalidChar(char),
    Reserved(String),
    EmptyStem,
}

impl std::fmt::Display for FilenameError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Empty => write!(f, "filename cannot be empty"),
            Self::TooLong(len) => write!(
                f,
                "filename exceeds maximum length of {} (got {})",
                MAX_FILENAME_LENGTH, len
            ),
            Self::Separator(c) => {
                write!(f, "filename must not contain path separator '{}'", c)
            }
            Self::InvalidChar(c) => {
                write!(f, "filename contains invalid character {:?}", c)
            }
            Self::Reserved(name) => write!(f, "'{}' is not a usable filename", name),
            Self::EmptyStem => write!(f, "filename must have a name before its extension"),
        }
    }
}

impl std::error::Error for FilenameError {}

/// Validate an uploaded filename.
///
/// A valid filename must:
/// - Not be empty
/// - Not exceed 255 bytes
/// - Not be `.` or `..`
/// - Contain no path separators or NUL bytes
/// - Have a non-empty stem before its extension
pub fn validate_filename(name: &str) -> Result<(), FilenameError> {
    if name.is_empty() {
        return Err(FilenameError::Empty);
    }

    if name.len() > MAX_FILENAME_LENGTH {
        return Err(FilenameError::TooLong(name.len()));
    }

    if name == "." || name == ".." {
        return Err(FilenameError::Reserved(name.to_string()));
    }

    for c in name.chars() {
        if c == '/' || c == '\\' {
            return Err(FilenameError::Separator(c));
        }
        if c == '\0' {
            return Err(FilenameError::InvalidChar(c));
        }
    }

    // The stem is everything before the last dot; ".csv" has none.
    if let Some((stem, _)) = name.rsplit_once('.') {
        if stem.is_empty() {
            return Err(FilenameError::EmptyStem);
        }
    }

    Ok(())
}
