//! Refresh Token Ledger
//! Mission: Persist long-lived, revocable refresh tokens
//!
//! Expiry is checked lazily on lookup. Nothing sweeps expired entries; they
//! simply stop resolving.

use crate::error::{ChirpyError, Result};
use crate::store::{DocumentStore, RefreshToken, UserId};
use chrono::{Duration, Utc};
use rand::rngs::OsRng;
use rand::RngCore;
use std::sync::Arc;
use tracing::{debug, info};

/// Token entropy in bytes (256 bits)
const TOKEN_BYTES: usize = 32;

/// Refresh tokens live in the document store next to the users they belong to
#[derive(Clone)]
pub struct RefreshLedger {
    store: Arc<DocumentStore>,
    ttl: Duration,
}

impl RefreshLedger {
    pub fn new(store: Arc<DocumentStore>) -> Self {
        Self {
            store,
            ttl: Duration::hours(24),
        }
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// Opaque hex token from the OS CSPRNG
    pub fn generate(&self) -> Result<String> {
        let mut bytes = [0u8; TOKEN_BYTES];
        OsRng
            .try_fill_bytes(&mut bytes)
            .map_err(|e| ChirpyError::EntropyUnavailable(e.to_string()))?;
        Ok(hex::encode(bytes))
    }

    /// Record `token` for `user_id`, expiring `ttl` from now
    pub fn save(&self, user_id: UserId, token: &str) -> Result<()> {
        let expires_at = Utc::now().checked_add_signed(self.ttl).ok_or_else(|| {
            ChirpyError::LifetimeOverflow(format!("refresh token ttl of {}", self.ttl))
        })?;
        let entry = RefreshToken {
            token: token.to_string(),
            user_id,
            expires_at,
        };

        self.store.transact(|doc| {
            doc.refresh_tokens.insert(entry.token.clone(), entry);
            Ok(())
        })?;

        debug!(user_id, "Saved refresh token");
        Ok(())
    }

    /// Generate and save in one call
    pub fn issue(&self, user_id: UserId) -> Result<String> {
        let token = self.generate()?;
        self.save(user_id, &token)?;
        Ok(token)
    }

    /// Owner of an active token
    pub fn resolve(&self, token: &str) -> Result<UserId> {
        let doc = self.store.read()?;
        let entry = doc
            .refresh_tokens
            .get(token)
            .ok_or(ChirpyError::TokenNotFound)?;

        if entry.is_expired_at(Utc::now()) {
            debug!(user_id = entry.user_id, "Refresh token expired");
            return Err(ChirpyError::TokenExpired);
        }

        Ok(entry.user_id)
    }

    pub fn revoke(&self, token: &str) -> Result<()> {
        let user_id = self.store.transact(|doc| {
            doc.refresh_tokens
                .remove(token)
                .map(|entry| entry.user_id)
                .ok_or(ChirpyError::TokenNotFound)
        })?;

        info!(user_id, "Revoked refresh token");
        Ok(())
    }
}
