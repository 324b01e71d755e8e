use serde::{Deserialize, Serialize};

use crate::authz::PermissionRule;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AuthConfig {
    /// Header carrying the raw API key.
    #[serde(default = "default_api_key_header")]
    pub api_key_header: String,

    /// Prefix discriminating user keys.
    #[serde(default = "default_user_key_prefix")]
    pub user_key_prefix: String,

    /// Prefix discriminating organization keys.
    #[serde(default = "default_org_key_prefix")]
    pub org_key_prefix: String,

    /// Platform admin created at startup when the user store is empty.
    /// Without it a fresh in-memory deployment has no usable credential.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bootstrap: Option<BootstrapAdmin>,

    /// Full replacement for the builtin permission table. Evaluated in
    /// declaration order, first match wins.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub permissions: Option<Vec<PermissionRule>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BootstrapAdmin {
    pub username: String,
    pub email: String,
    /// The raw key this admin will authenticate with. Must carry the user
    /// key prefix. Typically injected via `${VAR}` interpolation.
    pub api_key: String,
}

fn default_api_key_header() -> String {
    "x-api-key".to_string()
}

fn default_user_key_prefix() -> String {
    "usr_".to_string()
}

fn default_org_key_prefix() -> String {
    "org_".to_string()
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            api_key_header: default_api_key_header(),
            user_key_prefix: default_user_key_prefix(),
            org_key_prefix: default_org_key_prefix(),
            bootstrap: None,
            permissions: None,
        }
    }
}

impl AuthConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.api_key_header.is_empty() {
            return Err("auth.api_key_header must not be empty".to_string());
        }
        if self.user_key_prefix.is_empty() || self.org_key_prefix.is_empty() {
            return Err("auth key prefixes must not be empty".to_string());
        }
        // The prefix is the sole discriminator of credential kind, so the
        // two prefixes must not shadow each other.
        if self.user_key_prefix.starts_with(&self.org_key_prefix)
            || self.org_key_prefix.starts_with(&self.user_key_prefix)
        {
            return Err(format!(
                "auth.user_key_prefix '{}' and auth.org_key_prefix '{}' must not overlap",
                self.user_key_prefix, self.org_key_prefix
            ));
        }
        if let Some(bootstrap) = &self.bootstrap {
            if !bootstrap.api_key.starts_with(&self.user_key_prefix) {
                return Err(format!(
                    "auth.bootstrap.api_key must start with the user key prefix '{}'",
                    self.user_key_prefix
                ));
            }
        }
        Ok(())
    }
}
