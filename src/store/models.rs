//! Persisted Records
//! Mission: Define the on-disk shape of users, chirps and refresh tokens

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub type UserId = u64;
pub type PostId = u64;

/// Registered account
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub email: String,
    #[serde(alias = "password")]
    pub password_hash: String, // bcrypt digest, never the plaintext
    /// Older snapshots predate promotion and carry no flag.
    #[serde(default, alias = "is_chirpy_red")]
    pub is_promoted: bool,
}

/// A chirp
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub id: PostId,
    pub body: String,
    /// Zero only for chirps written before authorship was recorded.
    #[serde(default)]
    pub author_id: UserId,
}

/// Long-lived credential exchanged for fresh access tokens
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefreshToken {
    #[serde(alias = "refresh_token")]
    pub token: String,
    pub user_id: UserId,
    #[serde(alias = "refresh_expires_at")]
    pub expires_at: DateTime<Utc>,
}

impl RefreshToken {
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}

/// The persisted root. Map keys are written as JSON strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentSet {
    #[serde(default)]
    pub users: BTreeMap<UserId, User>,
    #[serde(default, rename = "chirps", alias = "posts")]
    pub posts: BTreeMap<PostId, Post>,
    #[serde(default)]
    pub refresh_tokens: BTreeMap<String, RefreshToken>,
}

/// Max-plus-one allocation. Ids freed by deleting the highest record get reused.
pub(crate) fn next_id<V>(map: &BTreeMap<u64, V>) -> u64 {
    map.keys().next_back().map_or(1, |max| max + 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_next_id_starts_at_one() {
        let map: BTreeMap<u64, ()> = BTreeMap::new();
        assert_eq!(next_id(&map), 1);
    }

    #[test]
    fn test_next_id_reuses_after_deleting_max() {
        let mut map = BTreeMap::new();
        map.insert(1, ());
        map.insert(2, ());
        map.insert(3, ());
        assert_eq!(next_id(&map), 4);

        map.remove(&3);
        assert_eq!(next_id(&map), 3);

        map.remove(&1);
        assert_eq!(next_id(&map), 3);
    }

    #[test]
    fn test_map_keys_serialize_as_strings() {
        let mut doc = DocumentSet::default();
        doc.users.insert(
            7,
            User {
                id: 7,
                email: "a@x.com".to_string(),
                password_hash: "hash".to_string(),
                is_promoted: false,
            },
        );

        let json = serde_json::to_value(&doc).unwrap();
        assert!(json["users"]["7"].is_object());
        assert!(json["chirps"].is_object());
        assert!(json["refresh_tokens"].is_object());
    }

    #[test]
    fn test_legacy_snapshot_loads() {
        let legacy = r#"{
            "chirps": {"1": {"body": "hello", "id": 1, "author_id": 1}},
            "users": {"1": {"email": "a@x.com", "password": "$2a$10$abc", "id": 1}},
            "refresh_tokens": {
                "ff00": {
                    "user_id": 1,
                    "refresh_token": "ff00",
                    "refresh_expires_at": "2024-05-01T12:00:00.123456+02:00"
                }
            }
        }"#;

        let doc: DocumentSet = serde_json::from_str(legacy).unwrap();
        let user = &doc.users[&1];
        assert_eq!(user.password_hash, "$2a$10$abc");
        assert!(!user.is_promoted);
        assert_eq!(doc.posts[&1].author_id, 1);

        let token = &doc.refresh_tokens["ff00"];
        assert_eq!(token.token, "ff00");
        assert_eq!(token.expires_at.to_rfc3339(), "2024-05-01T10:00:00.123456+00:00");
    }

    #[test]
    fn test_missing_maps_default_to_empty() {
        let doc: DocumentSet = serde_json::from_str(r#"{"chirps": {}}"#).unwrap();
        assert!(doc.users.is_empty());
        assert!(doc.refresh_tokens.is_empty());
    }

    #[test]
    fn test_posts_alias_accepted() {
        let doc: DocumentSet =
            serde_json::from_str(r#"{"posts": {"2": {"id": 2, "body": "x", "author_id": 5}}}"#)
                .unwrap();
        assert_eq!(doc.posts[&2].author_id, 5);
    }
}
