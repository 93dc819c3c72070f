//! Error taxonomy shared by the store, repositories and auth layers.

/// Every failure the core can report to the HTTP layer.
#[derive(Debug)]
pub enum ChirpyError {
    /// Backing file could not be read, written or (de)serialized.
    StorageUnavailable(String),
    /// Lookup miss; carries a short description of what was missing.
    NotFound(String),
    EmailExists,
    /// Caller does not own the resource it tried to mutate.
    NotAuthorized,
    InvalidToken,
    TokenExpired,
    TokenNotFound,
    HashingFailure(String),
    TokenSigning(String),
    EntropyUnavailable(String),
    /// Token lifetime pushes its expiry past the representable time range.
    LifetimeOverflow(String),
}

impl ChirpyError {
    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound(what.into())
    }

    /// True for the failures that must be reported uniformly as "unauthenticated".
    pub fn is_unauthenticated(&self) -> bool {
        matches!(
            self,
            Self::InvalidToken | Self::TokenExpired | Self::TokenNotFound
        )
    }
}

impl std::fmt::Display for ChirpyError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::StorageUnavailable(e) => write!(f, "Storage unavailable: {}", e),
            Self::NotFound(what) => write!(f, "Not found: {}", what),
            Self::EmailExists => write!(f, "Email already exists"),
            Self::NotAuthorized => write!(f, "Not authorized"),
            Self::InvalidToken => write!(f, "Invalid token"),
            Self::TokenExpired => write!(f, "Token expired"),
            Self::TokenNotFound => write!(f, "Token not found"),
            Self::HashingFailure(e) => write!(f, "Hashing failure: {}", e),
            Self::TokenSigning(e) => write!(f, "Token signing failure: {}", e),
            Self::EntropyUnavailable(e) => write!(f, "Entropy unavailable: {}", e),
            Self::LifetimeOverflow(e) => write!(f, "Token lifetime overflow: {}", e),
        }
    }
}

impl std::error::Error for ChirpyError {}

impl From<std::io::Error> for ChirpyError {
    fn from(e: std::io::Error) -> Self {
        Self::StorageUnavailable(e.to_string())
    }
}

impl From<serde_json::Error> for ChirpyError {
    fn from(e: serde_json::Error) -> Self {
        Self::StorageUnavailable(e.to_string())
    }
}

impl From<bcrypt::BcryptError> for ChirpyError {
    fn from(e: bcrypt::BcryptError) -> Self {
        Self::HashingFailure(e.to_string())
    }
}

pub type Result<T, E = ChirpyError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unauthenticated_grouping() {
        assert!(ChirpyError::InvalidToken.is_unauthenticated());
        assert!(ChirpyError::TokenExpired.is_unauthenticated());
        assert!(ChirpyError::TokenNotFound.is_unauthenticated());

        assert!(!ChirpyError::NotAuthorized.is_unauthenticated());
        assert!(!ChirpyError::not_found("user 1").is_unauthenticated());
    }

    #[test]
    fn test_io_error_maps_to_storage_unavailable() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err: ChirpyError = io.into();
        assert!(matches!(err, ChirpyError::StorageUnavailable(_)));
        assert!(err.to_string().contains("denied"));
    }
}
