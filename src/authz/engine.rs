//! The authorization engine: first-match rule lookup plus the allow/deny
//! decision for a resolved identity.

use std::sync::Arc;

use super::table::{HttpMethod, PermissionTable};
use crate::auth::Identity;

/// Why a request was denied. Each variant surfaces as a distinct HTTP
/// status/message so callers can tell them apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenyReason {
    /// No rule matched the method+path at all (fail closed).
    NoMatchingRule,
    /// The route requires a credential and none was presented.
    AuthenticationRequired,
    /// An organization key was presented on a user-key-only route.
    OrgKeyNotAllowedOnUserRoute,
    /// The user's platform role is not in the rule's allow-list.
    InsufficientUserRole,
    /// The organization key's scope is not in the rule's allow-list.
    InsufficientOrgScope,
}

impl DenyReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            DenyReason::NoMatchingRule => "no_matching_rule",
            DenyReason::AuthenticationRequired => "authentication_required",
            DenyReason::OrgKeyNotAllowedOnUserRoute => "org_key_not_allowed",
            DenyReason::InsufficientUserRole => "insufficient_user_role",
            DenyReason::InsufficientOrgScope => "insufficient_org_scope",
        }
    }
}

/// Stateless evaluator over the immutable permission table. Cheap to clone;
/// safe for unsynchronized concurrent use.
#[derive(Clone)]
pub struct AuthzEngine {
    table: Arc<PermissionTable>,
}

impl AuthzEngine {
    pub fn new(table: Arc<PermissionTable>) -> Self {
        Self { table }
    }

    pub fn table(&self) -> &PermissionTable {
        &self.table
    }

    /// Decide a request. `path` must already have the server base path
    /// stripped.
    ///
    /// Public rules allow unconditionally, ignoring any identity that
    /// happens to be attached. All other rules require one, and check it
    /// against the rule's allow-lists.
    pub fn authorize(
        &self,
        identity: &Identity,
        method: HttpMethod,
        path: &str,
    ) -> Result<(), DenyReason> {
        let Some(rule) = self.table.find_rule(method, path) else {
            return Err(DenyReason::NoMatchingRule);
        };

        if rule.public {
            return Ok(());
        }

        match identity {
            Identity::Anonymous => Err(DenyReason::AuthenticationRequired),
            Identity::User(user) => {
                if rule.allows_user_role(user.role) {
                    Ok(())
                } else {
                    Err(DenyReason::InsufficientUserRole)
                }
            }
            Identity::Organization(org) => {
                if rule.user_key_only {
                    return Err(DenyReason::OrgKeyNotAllowedOnUserRoute);
                }
                if rule.allows_org_scope(org.scope) {
                    Ok(())
                } else {
                    Err(DenyReason::InsufficientOrgScope)
                }
            }
        }
    }
}
