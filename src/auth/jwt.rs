//! JWT Token Issuer
//! Mission: Issue and validate short-lived access tokens
//!
//! Access tokens are stateless and cannot be revoked, so their lifetime is
//! capped at `max_ttl`. Revocation lives in the refresh ledger instead.

use crate::auth::models::Claims;
use crate::error::{ChirpyError, Result};
use crate::store::UserId;
use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use std::time::Duration;
use tracing::{debug, warn};

/// Issuer claim stamped on every token this service mints
pub const ISSUER: &str = "chirpy";

/// Longest (and default) access-token lifetime
pub const DEFAULT_MAX_TTL: Duration = Duration::from_secs(60 * 60);

/// Signs and verifies HS256 access tokens
pub struct TokenIssuer {
    secret: String,
    max_ttl: Duration,
}

impl TokenIssuer {
    /// Create an issuer with the server-held signing secret
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            max_ttl: DEFAULT_MAX_TTL,
        }
    }

    /// Override the lifetime cap. A zero cap keeps the default.
    pub fn with_max_ttl(mut self, max_ttl: Duration) -> Self {
        if !max_ttl.is_zero() {
            self.max_ttl = max_ttl;
        }
        self
    }

    pub fn max_ttl(&self) -> Duration {
        self.max_ttl
    }

    /// Zero or over-cap lifetimes fall back to the cap instead of failing.
    pub fn effective_ttl(&self, ttl: Duration) -> Duration {
        if ttl.is_zero() || ttl > self.max_ttl {
            self.max_ttl
        } else {
            ttl
        }
    }

    /// Issue an access token for `user_id`
    pub fn issue(&self, user_id: UserId, ttl: Duration) -> Result<String> {
        let ttl = self.effective_ttl(ttl);
        // Round sub-second lifetimes up so the token outlives the current second
        let ttl_secs = ttl.as_secs().saturating_add(u64::from(ttl.subsec_nanos() > 0));

        let issued_at = Utc::now();
        let expires_at = i64::try_from(ttl_secs)
            .ok()
            .and_then(chrono::Duration::try_seconds)
            .and_then(|ttl| issued_at.checked_add_signed(ttl))
            .ok_or_else(|| {
                ChirpyError::LifetimeOverflow(format!("access token ttl of {}s", ttl_secs))
            })?;

        let claims = Claims {
            iss: ISSUER.to_string(),
            iat: issued_at.timestamp(),
            exp: expires_at.timestamp(),
            sub: user_id.to_string(),
        };

        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .map_err(|e| ChirpyError::TokenSigning(e.to_string()))?;

        debug!(user_id, expires_in_secs = ttl_secs, "Issued access token");
        Ok(token)
    }

    /// Validate an access token and return its subject
    pub fn validate(&self, token: &str) -> Result<UserId> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub", "iss"]);

        let decoded = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &validation,
        )
        .map_err(|e| {
            debug!(error = %e, "Rejected access token");
            ChirpyError::InvalidToken
        })?;

        // A foreign issuer means another trust domain minted it: treat as anonymous
        if decoded.claims.iss != ISSUER {
            warn!(issuer = %decoded.claims.iss, "Rejected access token from foreign issuer");
            return Err(ChirpyError::InvalidToken);
        }

        match decoded.claims.sub.parse::<UserId>() {
            Ok(user_id) if user_id > 0 => Ok(user_id),
            _ => {
                warn!("Rejected access token with malformed subject");
                Err(ChirpyError::InvalidToken)
            }
        }
    }
}
