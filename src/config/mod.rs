//! Configuration: a TOML file with `${VAR_NAME}` environment interpolation.
//!
//! ```toml
//! [server]
//! host = "0.0.0.0"
//! port = 8080
//! base_path = "/api/v1"
//!
//! [auth]
//! api_key_header = "x-api-key"
//!
//! [auth.bootstrap]
//! username = "root"
//! email = "root@example.com"
//! api_key = "${PORTICO_BOOTSTRAP_KEY}"
//! ```

mod auth;
mod server;

use std::path::{Path, PathBuf};

pub use auth::*;
use serde::{Deserialize, Serialize};
pub use server::*;
use thiserror::Error;

use crate::authz::{PermissionTable, TableError};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {1}: {0}")]
    Io(std::io::Error, PathBuf),

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Environment variable '{0}' referenced in config is not set")]
    MissingEnvVar(String),

    #[error("Invalid configuration: {0}")]
    Validation(String),

    #[error("Invalid permission rule: {0}")]
    Permissions(#[from] TableError),
}

/// Root configuration. All sections are optional with defaults that give a
/// working local server.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PorticoConfig {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub auth: AuthConfig,
}

impl PorticoConfig {
    /// Load configuration from a TOML file, expanding `${VAR}` references.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::Io(e, path.as_ref().to_path_buf()))?;
        Self::from_toml(&contents)
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        let expanded = expand_env_vars(contents)?;
        let config: PorticoConfig = toml::from_str(&expanded)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        self.server.validate().map_err(ConfigError::Validation)?;
        self.auth.validate().map_err(ConfigError::Validation)?;
        Ok(())
    }

    /// The permission table this deployment runs with: the rules from
    /// `[[auth.permissions]]` when present, otherwise the builtin policy.
    pub fn permission_table(&self) -> Result<PermissionTable, ConfigError> {
        match &self.auth.permissions {
            Some(rules) => Ok(PermissionTable::new(rules.clone())?),
            None => Ok(PermissionTable::builtin()?),
        }
    }
}

/// Expand `${VAR_NAME}` references against the process environment.
/// A reference to an unset variable is an error, not an empty string.
fn expand_env_vars(contents: &str) -> Result<String, ConfigError> {
    let mut out = String::with_capacity(contents.len());
    let mut rest = contents;

    while let Some(start) = rest.find("${") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let Some(end) = after.find('}') else {
            // Unterminated reference; keep the remainder verbatim.
            out.push_str(&rest[start..]);
            return Ok(out);
        };
        let name = &after[..end];
        let value =
            std::env::var(name).map_err(|_| ConfigError::MissingEnvVar(name.to_string()))?;
        out.push_str(&value);
        rest = &after[end + 1..];
    }

    out.push_str(rest);
    Ok(out)
}
