//! Password hashing with bcrypt.
//!
//! bcrypt reads at most 72 bytes of input. Longer passwords are truncated to
//! that bound before hashing and before verification, as an explicit policy:
//! the bytes past the bound never participate in the credential.

/// Input bound of the bcrypt primitive, in bytes.
pub const BCRYPT_INPUT_BOUND: usize = 72;

fn bounded(password: &str) -> &[u8] {
    let bytes = password.as_bytes();
    &bytes[..bytes.len().min(BCRYPT_INPUT_BOUND)]
}

/// Hash a password with the default bcrypt cost.
pub fn hash_password(password: &str) -> Result<String, bcrypt::BcryptError> {
    bcrypt::hash(bounded(password), bcrypt::DEFAULT_COST)
}

/// Verify a password against a stored hash.
pub fn verify_password(password: &str, hash: &str) -> Result<bool, bcrypt::BcryptError> {
    bcrypt::verify(bounded(password), hash)
}
