/// Utility functions for lock token generation
use crate::domain::errors::{LockError, LockResult};
use rand::{rngs::OsRng, RngCore};

/// Number of secure random bytes behind each lock token
pub const LOCK_TOKEN_BYTES: usize = 16;

const RADIX: u32 = 32;

/// Generate a lock ownership token
///
/// Draws 16 bytes from the operating system RNG and concatenates the radix-32
/// digits of each byte (`0-9a-v`). A byte encodes to one or two characters, so
/// tokens are 16 to 32 characters long.
///
/// # Examples
///
/// ```
/// use oxilock::shared::utils::generate_lock_token;
/// let token = generate_lock_token().unwrap();
/// assert!(token.len() >= 16 && token.len() <= 32);
/// assert!(token.chars().all(|c| c.is_ascii_alphanumeric()));
/// ```
pub fn generate_lock_token() -> LockResult<String> {
    let mut bytes = [0u8; LOCK_TOKEN_BYTES];
    OsRng
        .try_fill_bytes(&mut bytes)
        .map_err(|e| LockError::RandomnessUnavailable(e.to_string()))?;
    Ok(encode_radix32(&bytes))
}

/// Concatenate the base-32 digit representation of each byte
pub fn encode_radix32(bytes: &[u8]) -> String {
    let mut encoded = String::with_capacity(bytes.len() * 2);
    for &byte in bytes {
        let value = u32::from(byte);
        if value >= RADIX {
            encoded.push(digit(value / RADIX));
        }
        encoded.push(digit(value % RADIX));
    }
    encoded
}

fn digit(value: u32) -> char {
    // value is always < RADIX here
    std::char::from_digit(value, RADIX).unwrap_or('0')
}
