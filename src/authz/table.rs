//! The route-permission table: an ordered list of data-only rules.
//!
//! The table is plain data, separate from the evaluation algorithm, so the
//! policy can be audited or overridden from configuration without touching
//! engine code. It is loaded once at startup, wrapped in an `Arc`, and never
//! mutated afterwards.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::matcher::{path_matches, pattern_is_valid};
use crate::models::{OrgKeyScope, UserRole};

/// The HTTP methods the permission table distinguishes. Anything else never
/// matches a rule and falls into the deny-by-default branch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
    Patch,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Patch => "PATCH",
        }
    }

    /// Convert from the wire method. Returns `None` for methods the table
    /// does not model (HEAD, OPTIONS, ...).
    pub fn from_method(method: &http::Method) -> Option<Self> {
        match *method {
            http::Method::GET => Some(HttpMethod::Get),
            http::Method::POST => Some(HttpMethod::Post),
            http::Method::PUT => Some(HttpMethod::Put),
            http::Method::DELETE => Some(HttpMethod::Delete),
            http::Method::PATCH => Some(HttpMethod::Patch),
            _ => None,
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for HttpMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "GET" => Ok(HttpMethod::Get),
            "POST" => Ok(HttpMethod::Post),
            "PUT" => Ok(HttpMethod::Put),
            "DELETE" => Ok(HttpMethod::Delete),
            "PATCH" => Ok(HttpMethod::Patch),
            _ => Err(format!("Unsupported HTTP method '{}'", s)),
        }
    }
}

/// One declarative route-permission rule.
///
/// Rules are evaluated in declaration order; the first rule whose pattern
/// and method both match decides the request. Absent `user_roles` means no
/// user key satisfies the rule; absent `org_scopes` means no organization
/// key does.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PermissionRule {
    /// Path pattern relative to the server base path, e.g. `/services/**`.
    pub path: String,
    pub methods: Vec<HttpMethod>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_roles: Option<Vec<UserRole>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub org_scopes: Option<Vec<OrgKeyScope>>,
    /// Reject organization keys outright, regardless of scope.
    #[serde(default)]
    pub user_key_only: bool,
    /// Allow without any credential. Other fields are ignored when set.
    #[serde(default)]
    pub public: bool,
}

impl PermissionRule {
    pub fn allows_user_role(&self, role: UserRole) -> bool {
        matches!(&self.user_roles, Some(roles) if roles.contains(&role))
    }

    pub fn allows_org_scope(&self, scope: OrgKeyScope) -> bool {
        matches!(&self.org_scopes, Some(scopes) if scopes.contains(&scope))
    }
}

#[derive(Debug, Error)]
pub enum TableError {
    #[error("Rule {index} has invalid path pattern '{path}': '**' may only be the final segment")]
    InvalidPattern { index: usize, path: String },

    #[error("Rule {index} ('{path}') lists no HTTP methods")]
    NoMethods { index: usize, path: String },
}

/// Immutable, ordered permission table.
#[derive(Debug, Clone)]
pub struct PermissionTable {
    rules: Vec<PermissionRule>,
}

impl PermissionTable {
    /// Build a table, validating every rule. Order is preserved.
    pub fn new(rules: Vec<PermissionRule>) -> Result<Self, TableError> {
        for (index, rule) in rules.iter().enumerate() {
            if !pattern_is_valid(&rule.path) {
                return Err(TableError::InvalidPattern {
                    index,
                    path: rule.path.clone(),
                });
            }
            if rule.methods.is_empty() {
                return Err(TableError::NoMethods {
                    index,
                    path: rule.path.clone(),
                });
            }
        }
        Ok(Self { rules })
    }

    /// First rule matching both method and path, in declaration order.
    /// `None` means the caller must deny (fail closed).
    pub fn find_rule(&self, method: HttpMethod, path: &str) -> Option<&PermissionRule> {
        self.rules
            .iter()
            .find(|rule| rule.methods.contains(&method) && path_matches(&rule.path, path))
    }

    /// The raw rule list, for policy audit tooling.
    #[allow(dead_code)]
    pub fn rules(&self) -> &[PermissionRule] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// The default policy shipped with the server. Deployments can replace
    /// it wholesale via `[[auth.permissions]]` in the config file.
    pub fn builtin() -> Result<Self, TableError> {
        use HttpMethod::*;
        use OrgKeyScope as S;
        use UserRole as R;

        fn rule(path: &str, methods: &[HttpMethod]) -> PermissionRule {
            PermissionRule {
                path: path.to_string(),
                methods: methods.to_vec(),
                user_roles: None,
                org_scopes: None,
                user_key_only: false,
                public: false,
            }
        }

        fn users(mut r: PermissionRule, roles: &[UserRole]) -> PermissionRule {
            r.user_roles = Some(roles.to_vec());
            r
        }

        fn orgs(mut r: PermissionRule, scopes: &[OrgKeyScope]) -> PermissionRule {
            r.org_scopes = Some(scopes.to_vec());
            r
        }

        fn user_key_only(mut r: PermissionRule) -> PermissionRule {
            r.user_key_only = true;
            r
        }

        fn public(mut r: PermissionRule) -> PermissionRule {
            r.public = true;
            r
        }

        let rules = vec![
            public(rule("/health", &[Get])),
            // Account self-service before the admin-only user routes.
            users(
                user_key_only(rule("/me", &[Get])),
                &[R::Admin, R::User],
            ),
            // User management is platform-admin territory.
            users(
                user_key_only(rule("/users/**", &[Get, Post, Put, Delete, Patch])),
                &[R::Admin],
            ),
            // Any user may create an organization; listing all of them is
            // admin-only.
            users(
                user_key_only(rule("/organizations", &[Post])),
                &[R::Admin, R::User],
            ),
            users(
                user_key_only(rule("/organizations", &[Get])),
                &[R::Admin],
            ),
            // Reading one organization: members (checked downstream by the
            // org-role layer) or the organization's own key.
            orgs(
                users(rule("/organizations/*", &[Get]), &[R::Admin, R::User]),
                &[S::All, S::Management],
            ),
            // Key listings never go to organization credentials.
            users(
                user_key_only(rule("/organizations/*/keys", &[Get])),
                &[R::Admin, R::User],
            ),
            // Mutating an organization, its members, and its keys requires a
            // user key; the org-role layer narrows it further per route.
            users(
                user_key_only(rule("/organizations/**", &[Post, Put, Delete, Patch])),
                &[R::Admin, R::User],
            ),
            // Catalog reads are open to every credential kind.
            orgs(
                users(rule("/services", &[Get]), &[R::Admin, R::User]),
                &[S::All, S::Management, S::Evaluation],
            ),
            orgs(
                users(rule("/services", &[Post]), &[R::Admin]),
                &[S::All, S::Management],
            ),
            orgs(
                users(rule("/services/**", &[Get]), &[R::Admin, R::User]),
                &[S::All, S::Management, S::Evaluation],
            ),
            users(
                user_key_only(rule("/services/**", &[Put, Delete])),
                &[R::Admin],
            ),
            // Contracts: management-capable org keys, or users (narrowed by
            // the org-role layer).
            orgs(
                users(
                    rule("/contracts/**", &[Get, Post]),
                    &[R::Admin, R::User],
                ),
                &[S::All, S::Management],
            ),
            // Feature evaluation: the evaluation scope exists for exactly
            // this surface.
            orgs(
                users(rule("/evaluation/**", &[Get]), &[R::Admin, R::User]),
                &[S::All, S::Evaluation],
            ),
        ];

        Self::new(rules)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> PermissionTable {
        PermissionTable::builtin().expect("builtin table is valid")
    }

    #[test]
    fn builtin_table_is_valid() {
        let t = table();
        assert!(!t.is_empty());
    }

    #[test]
    fn first_match_wins_over_later_rules() {
        // Two rules match GET /organizations/42; declaration order decides.
        let rules = vec![
            PermissionRule {
                path: "/organizations/*".to_string(),
                methods: vec![HttpMethod::Get],
                user_roles: Some(vec![UserRole::Admin]),
                org_scopes: None,
                user_key_only: false,
                public: false,
            },
            PermissionRule {
                path: "/organizations/**".to_string(),
                methods: vec![HttpMethod::Get],
                user_roles: Some(vec![UserRole::Admin, UserRole::User]),
                org_scopes: None,
                user_key_only: false,
                public: false,
            },
        ];
        let table = PermissionTable::new(rules).unwrap();
        let rule = table
            .find_rule(HttpMethod::Get, "/organizations/42")
            .unwrap();
        assert_eq!(rule.path, "/organizations/*");
        assert!(!rule.allows_user_role(UserRole::User));
    }

    #[test]
    fn no_rule_means_none() {
        let t = table();
        assert!(t.find_rule(HttpMethod::Delete, "/nonexistent").is_none());
        // A path that exists under a different method only.
        assert!(t.find_rule(HttpMethod::Post, "/health").is_none());
    }

    #[test]
    fn method_and_path_must_both_match() {
        let t = table();
        let get = t.find_rule(HttpMethod::Get, "/services").unwrap();
        assert!(get.allows_org_scope(OrgKeyScope::Evaluation));

        let post = t.find_rule(HttpMethod::Post, "/services").unwrap();
        assert!(!post.allows_org_scope(OrgKeyScope::Evaluation));
        assert!(post.allows_org_scope(OrgKeyScope::Management));
    }

    #[test]
    fn interior_double_star_rejected_at_load() {
        let rules = vec![PermissionRule {
            path: "/a/**/b".to_string(),
            methods: vec![HttpMethod::Get],
            user_roles: None,
            org_scopes: None,
            user_key_only: false,
            public: false,
        }];
        assert!(matches!(
            PermissionTable::new(rules),
            Err(TableError::InvalidPattern { index: 0, .. })
        ));
    }

    #[test]
    fn empty_method_list_rejected_at_load() {
        let rules = vec![PermissionRule {
            path: "/a".to_string(),
            methods: vec![],
            user_roles: None,
            org_scopes: None,
            user_key_only: false,
            public: false,
        }];
        assert!(matches!(
            PermissionTable::new(rules),
            Err(TableError::NoMethods { index: 0, .. })
        ));
    }

    #[test]
    fn rules_deserialize_from_toml() {
        let doc = r#"
            [[rules]]
            path = "/widgets/**"
            methods = ["GET", "POST"]
            user_roles = ["admin"]
            org_scopes = ["all", "management"]

            [[rules]]
            path = "/ping"
            methods = ["GET"]
            public = true
        "#;

        #[derive(Deserialize)]
        struct Doc {
            rules: Vec<PermissionRule>,
        }

        let doc: Doc = toml::from_str(doc).unwrap();
        let table = PermissionTable::new(doc.rules).unwrap();
        assert_eq!(table.len(), 2);
        let rule = table.find_rule(HttpMethod::Post, "/widgets/7").unwrap();
        assert!(rule.allows_user_role(UserRole::Admin));
        assert!(!rule.allows_user_role(UserRole::User));
        assert!(table.find_rule(HttpMethod::Get, "/ping").unwrap().public);
    }

    #[test]
    fn http_method_conversions() {
        assert_eq!(
            HttpMethod::from_method(&http::Method::GET),
            Some(HttpMethod::Get)
        );
        assert_eq!(HttpMethod::from_method(&http::Method::HEAD), None);
        assert_eq!("PATCH".parse::<HttpMethod>(), Ok(HttpMethod::Patch));
        assert!("TRACE".parse::<HttpMethod>().is_err());
    }
}
