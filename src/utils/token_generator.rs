//! Token value generation.

use crate::domain::entities::TOKEN_LENGTH;
use rand::Rng;
use rand::distr::Alphanumeric;

/// Generates a cryptographically random token value.
///
/// # Format
///
/// - Length: [`TOKEN_LENGTH`] (128) characters
/// - Character set: A-Z, a-z, 0-9, sampled uniformly
/// - Entropy: ~762 bits
///
/// `rand::rng()` is a ChaCha-based CSPRNG seeded from the operating system.
pub fn generate_token() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(TOKEN_LENGTH)
        .map(char::from)
        .collect()
}

/// Returns `true` if `value` has the shape of a generated token.
///
/// Used to reject obviously malformed input before touching storage.
pub fn is_well_formed(value: &str) -> bool {
    value.len() == TOKEN_LENGTH && value.bytes().all(|b| b.is_ascii_alphanumeric())
}
