//! Document Store
//! Mission: Keep every record in one JSON file with whole-document transactions

pub mod document_store;
pub mod models;

pub use document_store::DocumentStore;
pub use models::{DocumentSet, Post, PostId, RefreshToken, User, UserId};
