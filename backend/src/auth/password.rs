//! Password hashing and verification.
//!
//! Wraps bcrypt: a salted, adaptive, deliberately slow one-way function. The
//! per-call salt and cost parameters are embedded in the hash output, so
//! verification needs no separate salt storage, and the underlying comparison
//! does not short-circuit on the first differing byte.

/// One-way hasher over plaintext passwords.
#[derive(Debug, Clone)]
pub struct PasswordHasher {
    cost: u32,
}

impl PasswordHasher {
    pub fn new(cost: u32) -> Self {
        Self { cost }
    }

    /// Hash `plaintext` with a fresh random salt.
    ///
    /// bcrypt is CPU-bound; callers on an async runtime should run this on a
    /// blocking worker (see `AuthService`).
    pub fn hash(&self, plaintext: &str) -> Result<String, bcrypt::BcryptError> {
        bcrypt::hash(plaintext, self.cost)
    }

    /// Constant-time check of `plaintext` against a stored hash. A malformed
    /// hash counts as a mismatch rather than an error.
    pub fn verify(&self, plaintext: &str, hash: &str) -> bool {
        bcrypt::verify(plaintext, hash).unwrap_or(false)
    }
}
