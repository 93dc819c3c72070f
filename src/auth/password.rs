//! Credential Hasher
//! Mission: One-way bcrypt hashing for stored passwords

use crate::error::Result;
use bcrypt::{hash, verify, DEFAULT_COST};

/// Salted, adaptive-cost password hashing
#[derive(Debug, Clone, Copy)]
pub struct CredentialHasher {
    cost: u32,
}

impl Default for CredentialHasher {
    fn default() -> Self {
        Self { cost: DEFAULT_COST }
    }
}

impl CredentialHasher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a specific bcrypt cost (4..=31). Tests use the minimum.
    pub fn with_cost(cost: u32) -> Self {
        Self { cost }
    }

    /// Hash with a fresh salt. Errors surface as `HashingFailure`.
    pub fn hash(&self, plaintext: &str) -> Result<String> {
        Ok(hash(plaintext, self.cost)?)
    }

    /// Re-derive and compare against `digest`.
    pub fn verify(&self, digest: &str, plaintext: &str) -> Result<bool> {
        Ok(verify(plaintext, digest)?)
    }
}
