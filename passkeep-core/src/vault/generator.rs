//! Random password generation.

use rand::Rng;

/// Default length of a generated password.
pub const DEFAULT_LENGTH: usize = 16;

/// Lowercase, uppercase, digits, and the specials the strength score
/// recognizes.
const CHARSET: &[u8] =
    b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789!@#$%^&*()_-+=";

/// Generate a random password of the given length.
pub fn generate(length: usize) -> String {
    let mut rng = rand::rng();
    (0..length)
        .map(|_| CHARSET[rng.random_range(0..CHARSET.len())] as char)
        .collect()
}

/// Generate a password of [`DEFAULT_LENGTH`].
pub fn generate_default() -> String {
    generate(DEFAULT_LENGTH)
}
