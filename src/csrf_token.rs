//! Provides the `state` value used to protect the LINE Login redirect against CSRF.
use rand::{TryRngCore, rngs::OsRng};
use tracing::error;

use crate::error::Error;

const CHARSET: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Largest multiple of the charset length that fits in a byte.
/// Bytes at or above it are discarded so every symbol stays equally likely.
const ACCEPT_BELOW: u8 = (u8::MAX as usize / CHARSET.len() * CHARSET.len()) as u8;

pub const STATE_LEN: usize = 32;

/// Returns a string of `len` characters drawn uniformly from `[a-zA-Z0-9]`.
///
/// Randomness comes from `OsRng`. Returns `Error::GenToken` if the OS
/// generator fails.
pub fn random_alphanumeric(len: usize) -> Result<String, Error> {
    let mut out = String::with_capacity(len);
    let mut buf = [0u8; 64];

    while out.len() < len {
        OsRng.try_fill_bytes(&mut buf).map_err(|e| {
            error!("Failed to generate random bytes: {:?}", e);
            Error::GenToken
        })?;
        for b in buf.iter().filter(|b| **b < ACCEPT_BELOW) {
            out.push(CHARSET[*b as usize % CHARSET.len()] as char);
            if out.len() == len {
                break;
            }
        }
    }
    Ok(out)
}

/// A randomly generated `state` value of 32 alphanumeric characters.
///
/// Store it (cookie, session store...) before redirecting the user, then compare it
/// with the `state` LINE sends back to the callback.
/// # Example
/// ```rust, no_run
/// use tiny_line_login::csrf_token::CSRFToken;
///
/// let csrf_token = CSRFToken::new().expect("Failed to generate CSRF token");
/// println!("Generated CSRF Token: {}", csrf_token.value());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct CSRFToken(pub(crate) String);

impl CSRFToken {
    /// Generates a new CSRF token using `OsRng`.
    pub fn new() -> Result<Self, Error> {
        random_alphanumeric(STATE_LEN).map(Self)
    }

    /// Returns the CSRF token as a string reference.
    pub fn value(&self) -> &str {
        &self.0
    }
}

/// A `state` received on the callback.
///
/// This token **has not been verified yet** and should be checked against the stored `CSRFToken` before proceeding.
#[derive(Debug, Clone)]
pub struct UnCheckedCSRFToken(pub(crate) String);

impl From<String> for UnCheckedCSRFToken {
    fn from(value: String) -> Self {
        Self(value)
    }
}

// ==========Tests==========
#[cfg(test)]
mod tests {
    use std::collections::{HashMap, HashSet};

    use super::{CHARSET, CSRFToken, STATE_LEN, random_alphanumeric};

    #[test]
    fn test_csrf_new() {
        let csrf_token = CSRFToken::new().unwrap();
        assert_eq!(csrf_token.value().len(), STATE_LEN);
        assert!(csrf_token.value().chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn test_random_alphanumeric_len() {
        assert_eq!(random_alphanumeric(0).unwrap(), "");
        assert_eq!(random_alphanumeric(1).unwrap().len(), 1);
        assert_eq!(random_alphanumeric(200).unwrap().len(), 200);
    }

    #[test]
    fn test_csrf_tokens_are_unique() {
        let tokens: HashSet<_> = (0..1000).map(|_| CSRFToken::new().unwrap().0).collect();
        assert_eq!(tokens.len(), 1000);
    }

    #[test]
    fn test_random_alphanumeric_distribution() {
        let sample = random_alphanumeric(62 * 1000).unwrap();
        let mut counts: HashMap<char, usize> = HashMap::new();
        for c in sample.chars() {
            *counts.entry(c).or_default() += 1;
        }

        // every symbol of the alphabet shows up, nothing else does
        assert_eq!(counts.len(), CHARSET.len());
        // expected 1000 each, sd ~31
        for (c, n) in counts {
            assert!((700..1300).contains(&n), "{c} appeared {n} times");
        }
    }
}
