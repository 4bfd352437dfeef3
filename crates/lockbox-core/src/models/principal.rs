//! Principal domain model.
//!
//! A principal is the resolved identity or capability behind a
//! request's presented credentials. It is derived once per request and
//! never persisted.

use serde::{Deserialize, Serialize};

use crate::models::audit::ActorType;

/// Actor id recorded for the static admin capability.
pub const ADMIN_KEY_ACTOR_ID: &str = "admin-key";

/// Actor id recorded for requests with no verified identity.
pub const ANONYMOUS_ACTOR_ID: &str = "anonymous";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Principal {
    /// No credentials, or none that resolved.
    Anonymous,
    /// Verified bearer-token identity.
    User { id: String, roles: Vec<String> },
    /// Holder of the static admin capability value. Possession-based:
    /// carries no user identity beyond the fixed sentinel id.
    AdminKey,
}

impl Principal {
    pub fn actor_type(&self) -> ActorType {
        match self {
            Principal::Anonymous => ActorType::Anonymous,
            Principal::User { .. } => ActorType::User,
            Principal::AdminKey => ActorType::AdminKey,
        }
    }

    pub fn actor_id(&self) -> &str {
        match self {
            Principal::Anonymous => ANONYMOUS_ACTOR_ID,
            Principal::User { id, .. } => id,
            Principal::AdminKey => ADMIN_KEY_ACTOR_ID,
        }
    }

    /// The user id, when this principal is a verified user.
    pub fn user_id(&self) -> Option<&str> {
        match self {
            Principal::User { id, .. } => Some(id),
            _ => None,
        }
    }

    pub fn is_admin_key(&self) -> bool {
        matches!(self, Principal::AdminKey)
    }
}
