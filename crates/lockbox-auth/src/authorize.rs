//! Per-operation permission matrix.
//!
//! The gate is a plain synchronous check performed before the guarded
//! operation: the operation proceeds only when `authorize` returns
//! `Ok(())`. Denials distinguish missing/invalid credentials
//! ([`AuthError::MissingCredentials`], mapped to Unauthorized) from
//! valid-but-insufficient ones ([`AuthError::Forbidden`]).

use lockbox_core::models::principal::Principal;

use crate::error::AuthError;

/// Every operation the vault can be asked to perform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SecretAction {
    ListMetadata,
    Create,
    ReadMetadata,
    Reveal,
    Rotate,
    UpdateMetadata,
    Delete,
    ReadAuditLog,
}

impl SecretAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            SecretAction::ListMetadata => "list-metadata",
            SecretAction::Create => "create",
            SecretAction::ReadMetadata => "read-metadata",
            SecretAction::Reveal => "reveal",
            SecretAction::Rotate => "rotate",
            SecretAction::UpdateMetadata => "update-metadata",
            SecretAction::Delete => "delete",
            SecretAction::ReadAuditLog => "read-audit-log",
        }
    }
}

/// Decide whether `principal` may perform `action`.
///
/// `owner_id` is the owning user of the targeted record, for the
/// actions where ownership matters; pass `None` for actions without a
/// target record.
pub fn authorize(
    principal: &Principal,
    action: SecretAction,
    owner_id: Option<&str>,
) -> Result<(), AuthError> {
    use SecretAction::*;

    match action {
        // Metadata is world-readable.
        ListMetadata | ReadMetadata => Ok(()),

        Create => match principal {
            Principal::Anonymous => Err(AuthError::MissingCredentials),
            Principal::User { .. } | Principal::AdminKey => Ok(()),
        },

        // Disclosure, rotation, deletion, and audit reads require the
        // admin capability; user identity (owner or not) never grants
        // them.
        Reveal | Rotate | Delete | ReadAuditLog => match principal {
            Principal::AdminKey => Ok(()),
            Principal::Anonymous => Err(AuthError::MissingCredentials),
            Principal::User { .. } => Err(AuthError::Forbidden {
                action: action.as_str(),
            }),
        },

        UpdateMetadata => match principal {
            Principal::AdminKey => Ok(()),
            Principal::Anonymous => Err(AuthError::MissingCredentials),
            Principal::User { id, .. } => {
                if owner_id.is_some_and(|owner| owner == id) {
                    Ok(())
                } else {
                    Err(AuthError::Forbidden {
                        action: action.as_str(),
                    })
                }
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn owner() -> Principal {
        Principal::User {
            id: "alice".into(),
            roles: vec!["admin".into()],
        }
    }

    fn other_user() -> Principal {
        Principal::User {
            id: "bob".into(),
            roles: vec![],
        }
    }

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Outcome {
        Allow,
        Unauthorized,
        Forbidden,
    }

    fn outcome(principal: &Principal, action: SecretAction, owner_id: Option<&str>) -> Outcome {
        match authorize(principal, action, owner_id) {
            Ok(()) => Outcome::Allow,
            Err(AuthError::MissingCredentials) => Outcome::Unauthorized,
            Err(AuthError::Forbidden { .. }) => Outcome::Forbidden,
            Err(other) => panic!("unexpected denial: {other:?}"),
        }
    }

    /// The full matrix, asserted pairwise: (action, anonymous,
    /// non-owner user, owner user, admin capability).
    #[test]
    fn permission_matrix() {
        use Outcome::*;
        use SecretAction::*;

        let cases = [
            (ListMetadata, Allow, Allow, Allow, Allow),
            (Create, Unauthorized, Allow, Allow, Allow),
            (ReadMetadata, Allow, Allow, Allow, Allow),
            (Reveal, Unauthorized, Forbidden, Forbidden, Allow),
            (Rotate, Unauthorized, Forbidden, Forbidden, Allow),
            (UpdateMetadata, Unauthorized, Forbidden, Allow, Allow),
            (Delete, Unauthorized, Forbidden, Forbidden, Allow),
            (ReadAuditLog, Unauthorized, Forbidden, Forbidden, Allow),
        ];

        let record_owner = Some("alice");
        for (action, anon, non_owner, owner_outcome, admin) in cases {
            assert_eq!(
                outcome(&Principal::Anonymous, action, record_owner),
                anon,
                "anonymous / {action:?}"
            );
            assert_eq!(
                outcome(&other_user(), action, record_owner),
                non_owner,
                "non-owner / {action:?}"
            );
            assert_eq!(
                outcome(&owner(), action, record_owner),
                owner_outcome,
                "owner / {action:?}"
            );
            assert_eq!(
                outcome(&Principal::AdminKey, action, record_owner),
                admin,
                "admin-key / {action:?}"
            );
        }
    }

    #[test]
    fn admin_role_on_a_user_token_grants_nothing_extra() {
        // Role labels ride along on the principal but privileged
        // actions are keyed to the capability, not to roles.
        let admin_role_user = Principal::User {
            id: "carol".into(),
            roles: vec!["admin".into()],
        };
        assert!(matches!(
            authorize(&admin_role_user, SecretAction::Reveal, Some("alice")),
            Err(AuthError::Forbidden { .. })
        ));
    }

    #[test]
    fn update_metadata_without_owner_context_denies_users() {
        assert!(matches!(
            authorize(&owner(), SecretAction::UpdateMetadata, None),
            Err(AuthError::Forbidden { .. })
        ));
        assert!(authorize(&Principal::AdminKey, SecretAction::UpdateMetadata, None).is_ok());
    }
}
