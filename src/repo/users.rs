//! User Repository
//! Mission: Manage accounts with unique emails on top of the document store

use crate::error::{ChirpyError, Result};
use crate::store::{models::next_id, DocumentStore, User, UserId};
use std::sync::Arc;
use tracing::{debug, info};

/// Users view over the shared document store
#[derive(Clone)]
pub struct UsersRepo {
    store: Arc<DocumentStore>,
}

impl UsersRepo {
    pub fn new(store: Arc<DocumentStore>) -> Self {
        Self { store }
    }

    /// Create a user. The email scan and the insert share one write transaction.
    pub fn create(&self, email: &str, password_hash: &str) -> Result<User> {
        let user = self.store.transact(|doc| {
            if doc.users.values().any(|u| u.email == email) {
                debug!(email, "Rejected duplicate email");
                return Err(ChirpyError::EmailExists);
            }

            let user = User {
                id: next_id(&doc.users),
                email: email.to_string(),
                password_hash: password_hash.to_string(),
                is_promoted: false,
            };
            doc.users.insert(user.id, user.clone());
            Ok(user)
        })?;

        info!(user_id = user.id, "✅ Created user");
        Ok(user)
    }

    /// Exact, case-sensitive match.
    pub fn find_by_email(&self, email: &str) -> Result<User> {
        self.store
            .read()?
            .users
            .into_values()
            .find(|u| u.email == email)
            .ok_or_else(|| ChirpyError::not_found("user"))
    }

    pub fn find_by_id(&self, id: UserId) -> Result<User> {
        self.store
            .read()?
            .users
            .remove(&id)
            .ok_or_else(|| ChirpyError::not_found(format!("user {}", id)))
    }

    /// Replace the full record. Ownership must be checked by the caller.
    ///
    /// Fails with [`ChirpyError::EmailExists`] when the new email belongs to
    /// another account.
    pub fn update(&self, user: &User) -> Result<()> {
        self.store.transact(|doc| {
            if !doc.users.contains_key(&user.id) {
                return Err(ChirpyError::not_found(format!("user {}", user.id)));
            }
            if doc
                .users
                .values()
                .any(|u| u.id != user.id && u.email == user.email)
            {
                return Err(ChirpyError::EmailExists);
            }

            doc.users.insert(user.id, user.clone());
            Ok(())
        })?;

        info!(user_id = user.id, "Updated user");
        Ok(())
    }

    pub fn promote(&self, id: UserId) -> Result<()> {
        self.store.transact(|doc| {
            let user = doc
                .users
                .get_mut(&id)
                .ok_or_else(|| ChirpyError::not_found(format!("user {}", id)))?;
            user.is_promoted = true;
            Ok(())
        })?;

        info!(user_id = id, "⭐ Promoted user");
        Ok(())
    }
}
