//! Centralized ID generation for resources.
//!
//! Format: [4-char prefix][26-char nanoid] = 30 chars total.
//! Alphabet: lowercase alphanumeric (0-9, a-z) so IDs are safe in URLs,
//! storage paths, and hostnames.

/// Custom lowercase alphabet shared by all resource IDs.
const ID_ALPHABET: [char; 36] = [
    '0', '1', '2', '3', '4', '5', '6', '7', '8', '9', 'a', 'b', 'c', 'd', 'e', 'f', 'g', 'h', 'i',
    'j', 'k', 'l', 'm', 'n', 'o', 'p', 'q', 'r', 's', 't', 'u', 'v', 'w', 'x', 'y', 'z',
];

/// The type of resource ID, determining its prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceId {
    User,
    Dataset,
}

impl ResourceId {
    /// Returns the 4-character prefix for this resource ID type.
    pub const fn prefix(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Dataset => "dset",
        }
    }
}

/// Generate a 30-char ID: 4-char prefix + 26-char nanoid (lowercase alphanumeric).
pub fn generate_id(resource: ResourceId) -> String {
    let suffix = nanoid::nanoid!(26, &ID_ALPHABET);
    format!("{}{}", resource.prefix(), suffix)
}

/// Generate a user ID (prefix: "user").
pub fn generate_user_id() -> String {
    generate_id(ResourceId::User)
}

/// Generate a dataset ID (prefix: "dset").
pub fn generate_dataset_id() -> String {
    generate_id(ResourceId::Dataset)
}
