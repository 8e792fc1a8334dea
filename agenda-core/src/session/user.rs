//! The user profile blob stored alongside the session token.

use serde::{Deserialize, Serialize};

use crate::item::ItemId;

/// User identifiers come in the same number-or-string shapes as item ids.
pub type UserId = ItemId;

/// Profile returned by the login endpoint.
///
/// Only the id and roles are interpreted; every other field is kept as-is
/// so the blob round-trips unchanged through storage.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct User {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<UserId>,

    /// Alternative id field used by some login responses
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<UserId>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub roles: Option<Vec<String>>,

    #[serde(flatten)]
    pub profile: serde_json::Map<String, serde_json::Value>,
}

impl User {
    /// A profile carrying only roles, for login responses without a user object.
    pub fn with_roles(roles: Vec<String>) -> Self {
        User {
            roles: Some(roles),
            ..Default::default()
        }
    }

    /// `id`, falling back to `user_id`. Zero and empty ids don't count.
    pub fn resolved_id(&self) -> Option<&UserId> {
        [self.id.as_ref(), self.user_id.as_ref()]
            .into_iter()
            .flatten()
            .find(|id| is_present(id))
    }

    /// Roles granted to this user; absent roles grant nothing.
    pub fn roles(&self) -> &[String] {
        self.roles.as_deref().unwrap_or_default()
    }

    pub fn has_role(&self, role: &str) -> bool {
        self.roles().iter().any(|r| r == role)
    }
}

fn is_present(id: &UserId) -> bool {
    match id {
        ItemId::Number(n) => *n != 0,
        ItemId::Text(s) => !s.trim().is_empty(),
    }
}
