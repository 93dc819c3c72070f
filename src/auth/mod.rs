//! Authentication Module
//! Mission: Password hashing, access tokens and the refresh-token ledger

pub mod jwt;
pub mod middleware;
pub mod models;
pub mod password;
pub mod refresh;

pub use jwt::TokenIssuer;
pub use middleware::{auth_middleware, AuthenticatedUser};
pub use password::CredentialHasher;
pub use refresh::RefreshLedger;
