//! Represents a nonce for the LINE Login authorization request.
use serde::{Deserialize, Serialize};

/// A `Nonce` is a **unique, random value** used to prevent replay attacks.
/// LINE copies it into the ID token, so the claims can be tied back to the request.
///
/// This structure generates a new random nonce using `UUIDv4` when created.
///
/// # **Example**
///
/// ```rust,no_run
/// use tiny_line_login::nonce::Nonce;
///
/// let nonce = Nonce::new();
/// println!("Generated Nonce: {}", nonce.value());
/// ```
/// - If the nonce in the claims does **not match**, the login should be rejected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Nonce(pub(crate) String);

impl Nonce {
    /// Generates a new nonce using **UUIDv4**.
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn value(&self) -> &str {
        &self.0
    }
}

/// Equivalent to `Nonce::new()`.
impl Default for Nonce {
    fn default() -> Self {
        Self::new()
    }
}

impl From<String> for Nonce {
    fn from(value: String) -> Self {
        Self(value)
    }
}
