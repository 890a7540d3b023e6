//! Dataset management: upload admission, filename validation, errors.

pub mod admission;
pub mod error;
pub mod validation;

pub use admission::{check_format, check_quota, check_size, AdmissionError};
pub use error::DatasetError;
pub use validation::{validate_filename, FilenameError};
