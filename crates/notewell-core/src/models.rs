//! Core data models for notewell.
//!
//! All wire-facing types serialize with camelCase field names; that is the
//! JSON dialect the existing web client speaks.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A registered account, or the guest singleton in guest deployments.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: i64,
    /// Unique across all users; enforced by the store at creation.
    pub email: String,
    pub name: String,
    /// Argon2id PHC string. Absent for accounts without local credentials.
    #[serde(default, skip_serializing)]
    pub password_hash: Option<String>,
    /// Subject identifier issued by an external identity provider, if linked.
    #[serde(default, skip_serializing)]
    pub external_provider_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Public view of this user, safe to return to clients.
    pub fn profile(&self) -> UserProfile {
        UserProfile {
            id: self.id,
            name: self.name.clone(),
            email: self.email.clone(),
        }
    }
}

/// The subset of a user exposed by `/api/user` and auth responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: i64,
    pub name: String,
    pub email: String,
}

/// A note owned by exactly one user.
///
/// Every read/update/delete goes through the store scoped by
/// `(id, owner_user_id)`; a note is invisible to any non-owner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub id: i64,
    pub owner_user_id: i64,
    pub title: String,
    pub content: String,
    /// Ordered tag list; `None` when the note has never been tagged.
    pub tags: Option<Vec<String>>,
    pub is_favorite: bool,
    pub created_at: DateTime<Utc>,
    /// Refreshed on every mutation, including favorite toggles.
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_note() -> Note {
        Note {
            id: 7,
            owner_user_id: 3,
            title: "Meeting notes".to_string(),
            content: "agenda".to_string(),
            tags: Some(vec!["work".to_string()]),
            is_favorite: false,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_note_serializes_camel_case() {
        let json = serde_json::to_value(sample_note()).unwrap();
        assert_eq!(json["ownerUserId"], 3);
        assert_eq!(json["isFavorite"], false);
        assert!(json.get("createdAt").is_some());
        assert!(json.get("owner_user_id").is_none());
    }

    #[test]
    fn test_user_profile_omits_credentials() {
        let user = User {
            id: 1,
            email: "a@example.com".to_string(),
            name: "A".to_string(),
            password_hash: Some("$argon2id$...".to_string()),
            external_provider_id: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let json = serde_json::to_value(&user).unwrap();
        assert!(json.get("passwordHash").is_none());
        assert!(json.get("externalProviderId").is_none());

        let profile = user.profile();
        assert_eq!(profile.id, 1);
        assert_eq!(profile.email, "a@example.com");
    }
}
