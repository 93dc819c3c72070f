//! Chirp Repository
//! Mission: Store chirps and enforce that only authors delete them

use crate::error::{ChirpyError, Result};
use crate::store::{models::next_id, DocumentStore, Post, PostId, UserId};
use std::sync::Arc;
use tracing::{debug, info};

/// Ordering by chirp id
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    /// Only `desc` selects descending order; anything else is ascending.
    pub fn from_param(param: Option<&str>) -> Self {
        match param {
            Some("desc") => SortOrder::Desc,
            _ => SortOrder::Asc,
        }
    }
}

/// Listing policy applied to a read snapshot
#[derive(Debug, Clone, Default)]
pub struct PostQuery {
    pub author_id: Option<UserId>,
    pub order: SortOrder,
}

/// Chirps view over the shared document store
#[derive(Clone)]
pub struct PostsRepo {
    store: Arc<DocumentStore>,
}

impl PostsRepo {
    pub fn new(store: Arc<DocumentStore>) -> Self {
        Self { store }
    }

    /// Create a chirp for an existing author.
    pub fn create(&self, body: &str, author_id: UserId) -> Result<Post> {
        let post = self.store.transact(|doc| {
            if !doc.users.contains_key(&author_id) {
                return Err(ChirpyError::not_found(format!("author {}", author_id)));
            }

            let post = Post {
                id: next_id(&doc.posts),
                body: body.to_string(),
                author_id,
            };
            doc.posts.insert(post.id, post.clone());
            Ok(post)
        })?;

        info!(chirp_id = post.id, author_id, "Created chirp");
        Ok(post)
    }

    pub fn list(&self, query: &PostQuery) -> Result<Vec<Post>> {
        // BTreeMap iteration is already ascending by id
        let mut posts: Vec<Post> = self
            .store
            .read()?
            .posts
            .into_values()
            .filter(|p| query.author_id.map_or(true, |author| p.author_id == author))
            .collect();

        if query.order == SortOrder::Desc {
            posts.reverse();
        }

        Ok(posts)
    }

    pub fn find_by_id(&self, id: PostId) -> Result<Post> {
        self.store
            .read()?
            .posts
            .remove(&id)
            .ok_or_else(|| ChirpyError::not_found(format!("chirp {}", id)))
    }

    /// Delete a chirp on behalf of `requesting_user_id`.
    ///
    /// The ownership check and the removal happen in one write transaction.
    pub fn delete_by_id(&self, id: PostId, requesting_user_id: UserId) -> Result<()> {
        self.store.transact(|doc| {
            let post = doc
                .posts
                .get(&id)
                .ok_or_else(|| ChirpyError::not_found(format!("chirp {}", id)))?;

            if post.author_id != requesting_user_id {
                debug!(
                    chirp_id = id,
                    author_id = post.author_id,
                    requesting_user_id,
                    "Rejected delete by non-author"
                );
                return Err(ChirpyError::NotAuthorized);
            }

            doc.posts.remove(&id);
            Ok(())
        })?;

        info!(chirp_id = id, "🗑️  Deleted chirp");
        Ok(())
    }
}
